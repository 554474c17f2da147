use crate::core::cancellation::CancellationToken;
use crate::domain::model::{Address, PostalCode};
use crate::domain::ports::AddressLookup;
use crate::utils::error::{LookupError, PostalCodeError};
use serde::Serialize;

/// Raw, unvalidated postal code exactly as the caller typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationRequest {
    raw: String,
}

impl ConsultationRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Why a consultation produced no address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissKind {
    NotProvided,
    InvalidCode,
    NotFound,
    Cancelled,
    LookupFailed,
}

impl MissKind {
    pub fn message(self) -> &'static str {
        match self {
            MissKind::NotProvided => "postal code not provided",
            MissKind::InvalidCode => "invalid postal code: must be exactly 8 digits",
            MissKind::NotFound => "postal code not found",
            MissKind::Cancelled => "operation cancelled",
            MissKind::LookupFailed => "lookup failed, try again later",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundAddress {
    pub postal_code: String,
    pub masked_postal_code: String,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl From<Address> for FoundAddress {
    fn from(address: Address) -> Self {
        Self {
            postal_code: address.postal_code().digits().to_string(),
            masked_postal_code: address.postal_code().masked(),
            street: address.street().map(str::to_string),
            complement: address.complement().map(str::to_string),
            district: address.district().map(str::to_string),
            city: address.city().map(str::to_string),
            region: address.region().map(str::to_string),
        }
    }
}

/// A failed consultation. The reason text always matches `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Miss {
    kind: MissKind,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    masked_postal_code: Option<String>,
}

impl Miss {
    fn new(kind: MissKind, code: Option<&PostalCode>) -> Self {
        Self {
            kind,
            reason: kind.message().to_string(),
            postal_code: code.map(|c| c.digits().to_string()),
            masked_postal_code: code.map(PostalCode::masked),
        }
    }

    pub fn kind(&self) -> MissKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn masked_postal_code(&self) -> Option<&str> {
        self.masked_postal_code.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsultationResponse {
    Found(FoundAddress),
    NotFound(Miss),
}

impl ConsultationResponse {
    fn miss(kind: MissKind, code: Option<&PostalCode>) -> Self {
        ConsultationResponse::NotFound(Miss::new(kind, code))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ConsultationResponse::Found(_))
    }

    pub fn found(&self) -> Option<&FoundAddress> {
        match self {
            ConsultationResponse::Found(found) => Some(found),
            ConsultationResponse::NotFound(_) => None,
        }
    }

    pub fn miss_kind(&self) -> Option<MissKind> {
        match self {
            ConsultationResponse::Found(_) => None,
            ConsultationResponse::NotFound(miss) => Some(miss.kind()),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ConsultationResponse::Found(_) => None,
            ConsultationResponse::NotFound(miss) => Some(miss.reason()),
        }
    }
}

/// Turns a raw postal code into a response, translating every failure into
/// [`ConsultationResponse::NotFound`]. Adapter error detail is logged, never returned.
pub struct ConsultationUseCase<L: AddressLookup> {
    lookup: L,
}

impl<L: AddressLookup> ConsultationUseCase<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub async fn execute(
        &self,
        request: ConsultationRequest,
        cancel: &CancellationToken,
    ) -> ConsultationResponse {
        let code = match PostalCode::parse(request.raw()) {
            Ok(code) => code,
            Err(PostalCodeError::Empty) => {
                tracing::debug!("Consultation rejected: no postal code given");
                return ConsultationResponse::miss(MissKind::NotProvided, None);
            }
            Err(PostalCodeError::Malformed { digits }) => {
                tracing::debug!(
                    "Consultation rejected: {:?} has {} digits",
                    request.raw(),
                    digits
                );
                return ConsultationResponse::miss(MissKind::InvalidCode, None);
            }
        };

        tracing::debug!("Resolving postal code {}", code);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LookupError::Cancelled),
            outcome = self.lookup.resolve(&code, cancel) => outcome,
        };

        match outcome {
            Ok(Some(address)) => {
                tracing::debug!("Postal code {} resolved", code);
                ConsultationResponse::Found(address.into())
            }
            Ok(None) => {
                tracing::info!("Postal code {} not found", code);
                ConsultationResponse::miss(MissKind::NotFound, None)
            }
            Err(LookupError::Cancelled) => {
                tracing::info!("Consultation for {} cancelled", code);
                ConsultationResponse::miss(MissKind::Cancelled, Some(&code))
            }
            Err(e) if cancel.is_cancelled() => {
                tracing::info!("Consultation for {} cancelled ({})", code, e);
                ConsultationResponse::miss(MissKind::Cancelled, Some(&code))
            }
            Err(e) => {
                tracing::warn!("Address lookup for {} failed: {}", code, e);
                ConsultationResponse::miss(MissKind::LookupFailed, Some(&code))
            }
        }
    }
}
