use crate::capabilities::args::BoundArgs;
use crate::capabilities::registry::{Capability, CapabilityHandler, CapabilityProvider};
use crate::core::CancellationToken;
use crate::utils::error::InvokeError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trivial capabilities for checking a host end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugTools;

struct Echo;
struct ReverseEcho;

#[async_trait]
impl CapabilityHandler for Echo {
    async fn call(
        &self,
        args: BoundArgs,
        _cancel: &CancellationToken,
    ) -> Result<Value, InvokeError> {
        let message = args.text("message").unwrap_or_default();
        Ok(Value::String(format!("Echo: {}", message)))
    }
}

#[async_trait]
impl CapabilityHandler for ReverseEcho {
    async fn call(
        &self,
        args: BoundArgs,
        _cancel: &CancellationToken,
    ) -> Result<Value, InvokeError> {
        let message = args.text("message").unwrap_or_default();
        Ok(Value::String(message.chars().rev().collect()))
    }
}

impl CapabilityProvider for DebugTools {
    fn provider_name(&self) -> &'static str {
        "DebugTools"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![
            Capability::new(
                "Echo",
                "DebugTools::echo",
                "Return the message prefixed with 'Echo: '",
                &["message"],
                Arc::new(Echo),
            ),
            Capability::new(
                "ReverseEcho",
                "DebugTools::reverse_echo",
                "Return the message reversed",
                &["message"],
                Arc::new(ReverseEcho),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilityArgs, CapabilityRegistry};

    #[tokio::test]
    async fn test_echo_and_reverse() {
        let registry = CapabilityRegistry::build(&[&DebugTools]).unwrap();
        let cancel = CancellationToken::new();

        let echoed = registry
            .invoke("Echo", CapabilityArgs::new().arg("olá"), &cancel)
            .await
            .unwrap();
        assert_eq!(echoed, Value::String("Echo: olá".to_string()));

        let reversed = registry
            .invoke(
                "ReverseEcho",
                CapabilityArgs::new().kwarg("message", "São Paulo"),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(reversed, Value::String("oluaP oãS".to_string()));
    }

    #[tokio::test]
    async fn test_missing_message_is_empty() {
        let registry = CapabilityRegistry::build(&[&DebugTools]).unwrap();
        let cancel = CancellationToken::new();

        let echoed = registry.invoke("Echo", CapabilityArgs::new(), &cancel).await;
        assert_eq!(echoed, Ok(Value::String("Echo: ".to_string())));

        let reversed = registry
            .invoke("ReverseEcho", CapabilityArgs::new(), &cancel)
            .await;
        assert_eq!(reversed, Ok(Value::String(String::new())));
    }
}
