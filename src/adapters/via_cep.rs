use crate::core::CancellationToken;
use crate::domain::model::{Address, PostalCode};
use crate::domain::ports::AddressLookup;
use crate::utils::error::{AgentError, LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound client settings. Plain data, no behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("cep-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Reply body of `GET /ws/{cep}/json/`. A miss is `{"erro": true}`.
#[derive(Debug, Deserialize)]
struct ViaCepReply {
    cep: Option<String>,
    logradouro: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    ibge: Option<String>,
    gia: Option<String>,
    ddd: Option<String>,
    erro: Option<bool>,
}

/// [`AddressLookup`] backed by the ViaCEP web service.
///
/// Transport errors, timeouts and unreadable replies are logged and reported
/// as absence. Only cancellation is surfaced as an error.
pub struct ViaCepLookup {
    client: Client,
    base_url: Url,
}

impl ViaCepLookup {
    pub fn new(settings: &LookupSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(&settings.base_url)?,
        })
    }

    fn endpoint(&self, code: &PostalCode) -> std::result::Result<Url, LookupError> {
        self.base_url
            .join(&format!("ws/{}/json/", code.digits()))
            .map_err(|e| LookupError::Transport(format!("cannot build request URL: {}", e)))
    }

    async fn fetch(&self, code: &PostalCode) -> std::result::Result<Option<Address>, LookupError> {
        let url = self.endpoint(code)?;
        tracing::debug!("Requesting {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("ViaCEP response status: {}", status);

        if !status.is_success() {
            tracing::warn!("ViaCEP returned status {} for postal code {}", status, code);
            return Ok(None);
        }

        let reply: ViaCepReply = response.json().await?;
        if reply.erro == Some(true) {
            tracing::info!("ViaCEP has no address for postal code {}", code);
            return Ok(None);
        }

        reply.into_address(code).map(Some)
    }
}

impl ViaCepReply {
    /// Keeps the code the source returned; it may be formatted differently.
    fn into_address(self, requested: &PostalCode) -> std::result::Result<Address, LookupError> {
        let postal_code = match self.cep.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(returned) => PostalCode::parse(returned).map_err(|e| {
                LookupError::UnexpectedReply(format!("returned postal code {:?}: {}", returned, e))
            })?,
            None => requested.clone(),
        };

        Ok(Address::new(postal_code)
            .with_street(self.logradouro)
            .with_complement(self.complemento)
            .with_district(self.bairro)
            .with_city(self.localidade)
            .with_region(self.uf)
            .with_ibge(self.ibge)
            .with_gia(self.gia)
            .with_ddd(self.ddd))
    }
}

/// `Url::join` drops the last path segment unless it ends with a slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized).map_err(|e| AgentError::InvalidConfigValueError {
        field: "lookup.base_url".to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

#[async_trait]
impl AddressLookup for ViaCepLookup {
    async fn resolve(
        &self,
        code: &PostalCode,
        cancel: &CancellationToken,
    ) -> std::result::Result<Option<Address>, LookupError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Lookup for postal code {} cancelled by caller", code);
                Err(LookupError::Cancelled)
            }
            outcome = self.fetch(code) => match outcome {
                Ok(address) => Ok(address),
                Err(e) => {
                    tracing::error!("Unexpected error looking up postal code {}: {}", code, e);
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: serde_json::Value) -> ViaCepReply {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_reply_prefers_returned_code() {
        let requested = PostalCode::parse("01001000").unwrap();
        let address = reply(serde_json::json!({
            "cep": "01001-001",
            "logradouro": "Praça da Sé",
            "complemento": "",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308",
            "gia": "1004",
            "ddd": "11"
        }))
        .into_address(&requested)
        .unwrap();

        assert_eq!(address.postal_code().digits(), "01001001");
        assert_eq!(address.complement(), None);
        assert_eq!(address.ibge(), Some("3550308"));
        assert_eq!(address.gia(), Some("1004"));
        assert_eq!(address.ddd(), Some("11"));
    }

    #[test]
    fn test_reply_without_code_falls_back_to_request() {
        let requested = PostalCode::parse("01001000").unwrap();
        let address = reply(serde_json::json!({ "localidade": "São Paulo" }))
            .into_address(&requested)
            .unwrap();
        assert_eq!(address.postal_code(), &requested);
    }

    #[test]
    fn test_reply_with_garbage_code_is_unexpected() {
        let requested = PostalCode::parse("01001000").unwrap();
        let err = reply(serde_json::json!({ "cep": "0100" }))
            .into_address(&requested)
            .unwrap_err();
        assert!(matches!(err, LookupError::UnexpectedReply(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let settings = LookupSettings {
            base_url: "http://localhost:9000/proxy".to_string(),
            ..LookupSettings::default()
        };
        let lookup = ViaCepLookup::new(&settings).unwrap();
        let code = PostalCode::parse("01001-000").unwrap();
        assert_eq!(
            lookup.endpoint(&code).unwrap().as_str(),
            "http://localhost:9000/proxy/ws/01001000/json/"
        );
    }
}
