use cep_agent::config::{self, CommonArgs};
use cep_agent::core::{AddressLookup, FoundAddress};
use cep_agent::{
    CancellationToken, ConsultationRequest, ConsultationResponse, ConsultationUseCase,
    ViaCepLookup,
};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

const PROMPT: &str = "CEP> ";
const EXIT_KEYWORD: &str = "exit";

#[derive(Parser)]
#[command(name = "cep-agent")]
#[command(about = "Look up Brazilian postal codes (CEP) interactively")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Look up this postal code once and exit instead of starting the prompt
    cep: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let agent_config = match args.common.resolve() {
        Ok(agent_config) => agent_config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    config::init_logging(&agent_config.logging);
    tracing::debug!("Effective configuration: {:?}", agent_config);

    let lookup = ViaCepLookup::new(&agent_config.lookup_settings())?;
    let use_case = ConsultationUseCase::new(lookup);
    let mut interrupts = listen_for_interrupts();

    if let Some(cep) = args.cep {
        let response = consult(&use_case, cep, &mut interrupts).await;
        print!("{}", render_response(&response));
        std::process::exit(if response.is_found() { 0 } else { 2 });
    }

    tracing::info!("cep-agent started. Enter a postal code (8 digits) or '{}'.", EXIT_KEYWORD);
    run_prompt(
        &use_case,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        &mut interrupts,
    )
    .await?;

    tracing::info!("cep-agent shutting down");
    Ok(())
}

/// Forwards every Ctrl-C for the lifetime of the process.
///
/// Registering the handler replaces the default SIGINT behaviour, so the
/// prompt loop has to treat an interrupt as a request to quit.
fn listen_for_interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Reads postal codes until `exit`, end of input, or an interrupt at the prompt.
/// An interrupt during a lookup only cancels that lookup.
async fn run_prompt<L, R, W>(
    use_case: &ConsultationUseCase<L>,
    input: R,
    mut output: W,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> anyhow::Result<()>
where
    L: AddressLookup,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                output.write_all(b"\n").await?;
                tracing::info!("Interrupted at the prompt");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case(EXIT_KEYWORD) {
            break;
        }

        let response = consult(use_case, input.to_string(), interrupts).await;
        output.write_all(render_response(&response).as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}

/// Runs one consultation; an interrupt while it is in flight cancels it.
async fn consult<L: AddressLookup>(
    use_case: &ConsultationUseCase<L>,
    raw: String,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> ConsultationResponse {
    let cancel = CancellationToken::new();
    let execution = use_case.execute(ConsultationRequest::new(raw), &cancel);
    tokio::pin!(execution);

    tokio::select! {
        response = &mut execution => response,
        Some(()) = interrupts.recv() => {
            tracing::info!("Interrupted; cancelling the current lookup");
            cancel.cancel();
            execution.await
        }
    }
}

fn render_response(response: &ConsultationResponse) -> String {
    match response {
        ConsultationResponse::Found(found) => render_address(found),
        ConsultationResponse::NotFound(miss) => format!("No result: {}\n", miss.reason()),
    }
}

fn render_address(found: &FoundAddress) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut text = format!("Result for {}:\n", found.masked_postal_code);
    text.push_str(&format!("- Street: {}\n", field(&found.street)));
    if let Some(complement) = &found.complement {
        text.push_str(&format!("- Complement: {}\n", complement));
    }
    text.push_str(&format!("- District: {}\n", field(&found.district)));
    text.push_str(&format!("- City: {}\n", field(&found.city)));
    text.push_str(&format!("- State: {}\n", field(&found.region)));
    text
}
