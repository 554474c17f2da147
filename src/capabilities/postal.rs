use crate::capabilities::args::BoundArgs;
use crate::capabilities::registry::{Capability, CapabilityHandler, CapabilityProvider};
use crate::core::{AddressLookup, CancellationToken, ConsultationRequest, ConsultationUseCase};
use crate::utils::error::InvokeError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const LOOKUP_CAPABILITY: &str = "BuscarCepAsync";

/// Exposes postal-code consultation to capability callers.
pub struct PostalCodeTools<L: AddressLookup> {
    use_case: Arc<ConsultationUseCase<L>>,
}

impl<L: AddressLookup> PostalCodeTools<L> {
    pub fn new(use_case: Arc<ConsultationUseCase<L>>) -> Self {
        Self { use_case }
    }
}

struct LookupPostalCode<L: AddressLookup> {
    use_case: Arc<ConsultationUseCase<L>>,
}

#[async_trait]
impl<L: AddressLookup + 'static> CapabilityHandler for LookupPostalCode<L> {
    async fn call(
        &self,
        args: BoundArgs,
        cancel: &CancellationToken,
    ) -> Result<Value, InvokeError> {
        // Absent and blank both become an empty request, answered as "not provided".
        let raw = args.text("cep").unwrap_or_default();
        let response = self
            .use_case
            .execute(ConsultationRequest::new(raw), cancel)
            .await;

        serde_json::to_value(&response).map_err(|e| InvokeError::Handler {
            capability: LOOKUP_CAPABILITY.to_string(),
            message: e.to_string(),
        })
    }
}

impl<L: AddressLookup + 'static> CapabilityProvider for PostalCodeTools<L> {
    fn provider_name(&self) -> &'static str {
        "PostalCodeTools"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::new(
            LOOKUP_CAPABILITY,
            "PostalCodeTools::lookup",
            "Look up a Brazilian postal code (CEP) and return its street address",
            &["cep"],
            Arc::new(LookupPostalCode {
                use_case: self.use_case.clone(),
            }),
        )]
    }
}
