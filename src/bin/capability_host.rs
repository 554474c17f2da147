use cep_agent::config::{self, CommonArgs};
use cep_agent::{host, standard_registry, CancellationToken, ConsultationUseCase, ViaCepLookup};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "capability-host")]
#[command(about = "Serve postal-code and debug capabilities as JSON lines over stdio")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Print the registered capabilities as JSON and exit
    #[arg(long)]
    list: bool,
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

    let lookup = ViaCepLookup::new(&agent_config.lookup_settings())?;
    let use_case = Arc::new(ConsultationUseCase::new(lookup));
    let registry = Arc::new(standard_registry(use_case)?);

    if args.list {
        println!("{}", serde_json::to_string_pretty(&registry.describe())?);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, cancelling in-flight calls");
                cancel.cancel();
            }
        });
    }

    tracing::info!("capability-host listening on stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = host::serve(registry, stdin, tokio::io::stdout(), cancel).await {
        tracing::error!("❌ Host stopped: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    tracing::info!("capability-host stopped");
    Ok(())
}
