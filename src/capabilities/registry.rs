use crate::capabilities::args::{BoundArgs, CapabilityArgs};
use crate::core::CancellationToken;
use crate::utils::error::{InvokeError, RegistryError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The operation behind a capability name.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn call(&self, args: BoundArgs, cancel: &CancellationToken) -> Result<Value, InvokeError>;
}

/// One named, externally invokable operation.
#[derive(Clone)]
pub struct Capability {
    name: String,
    handler_id: String,
    description: String,
    params: Vec<String>,
    handler: Arc<dyn CapabilityHandler>,
}

impl Capability {
    pub fn new(
        name: impl Into<String>,
        handler_id: impl Into<String>,
        description: impl Into<String>,
        params: &[&str],
        handler: Arc<dyn CapabilityHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            handler_id: handler_id.into(),
            description: description.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.params.clone(),
        }
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("handler_id", &self.handler_id)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Anything that contributes capabilities to the registry.
pub trait CapabilityProvider {
    fn provider_name(&self) -> &'static str;
    fn capabilities(&self) -> Vec<Capability>;
}

/// Public listing entry for a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

/// Build-once dispatch table from capability name to handler.
///
/// Nothing mutates the table after `build`, so concurrent `invoke` calls share
/// it through `&self` or an `Arc` without locking.
#[derive(Debug)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn build(providers: &[&dyn CapabilityProvider]) -> Result<Self, RegistryError> {
        let mut entries: BTreeMap<String, Capability> = BTreeMap::new();

        for provider in providers {
            for capability in provider.capabilities() {
                if capability.name.trim().is_empty() {
                    return Err(RegistryError::EmptyName {
                        provider: provider.provider_name().to_string(),
                    });
                }
                if let Some(existing) = entries.get(&capability.name) {
                    return Err(RegistryError::DuplicateCapability {
                        name: capability.name.clone(),
                        first: existing.handler_id.clone(),
                        second: capability.handler_id.clone(),
                    });
                }
                entries.insert(capability.name.clone(), capability);
            }
        }

        if entries.is_empty() {
            tracing::warn!("No capabilities registered; every invocation will be rejected");
        } else {
            tracing::info!("Registered {} capabilities:", entries.len());
            for capability in entries.values() {
                tracing::info!(" - {}: {}", capability.name, capability.handler_id);
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted by name.
    pub fn describe(&self) -> Vec<CapabilityDescriptor> {
        self.entries.values().map(Capability::descriptor).collect()
    }

    /// Routes a call by exact, case-sensitive name. The handler's result is
    /// returned untouched.
    pub async fn invoke(
        &self,
        name: &str,
        args: CapabilityArgs,
        cancel: &CancellationToken,
    ) -> Result<Value, InvokeError> {
        let capability = self.entries.get(name).ok_or_else(|| {
            tracing::warn!("Rejected call to unknown capability {:?}", name);
            InvokeError::UnknownCapability(name.to_string())
        })?;

        let bound = args.bind(&capability.name, &capability.params)?;
        tracing::debug!("Dispatching {} to {}", capability.name, capability.handler_id);
        capability.handler.call(bound, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(&'static str);

    #[async_trait]
    impl CapabilityHandler for Constant {
        async fn call(
            &self,
            _args: BoundArgs,
            _cancel: &CancellationToken,
        ) -> Result<Value, InvokeError> {
            Ok(Value::String(self.0.to_string()))
        }
    }

    struct Fixed {
        provider: &'static str,
        names: Vec<&'static str>,
    }

    impl CapabilityProvider for Fixed {
        fn provider_name(&self) -> &'static str {
            self.provider
        }

        fn capabilities(&self) -> Vec<Capability> {
            self.names
                .iter()
                .map(|name| {
                    Capability::new(
                        *name,
                        format!("{}::{}", self.provider, name.to_lowercase()),
                        "test capability",
                        &[],
                        Arc::new(Constant(*name)),
                    )
                })
                .collect()
        }
    }

    fn fixed(provider: &'static str, names: Vec<&'static str>) -> Fixed {
        Fixed { provider, names }
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let a = fixed("A", vec!["Ping"]);
        let b = fixed("B", vec!["Ping"]);

        let err = CapabilityRegistry::build(&[&a, &b]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateCapability {
                name: "Ping".to_string(),
                first: "A::ping".to_string(),
                second: "B::ping".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_blank_names() {
        let a = fixed("A", vec![" "]);
        assert_eq!(
            CapabilityRegistry::build(&[&a]).unwrap_err(),
            RegistryError::EmptyName {
                provider: "A".to_string()
            }
        );
    }

    #[test]
    fn test_build_with_no_providers_is_empty() {
        let registry = CapabilityRegistry::build(&[]).unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_is_case_sensitive() {
        let a = fixed("A", vec!["Ping", "Pong"]);
        let registry = CapabilityRegistry::build(&[&a]).unwrap();
        let cancel = CancellationToken::new();

        let result = registry.invoke("Pong", CapabilityArgs::new(), &cancel).await;
        assert_eq!(result, Ok(Value::String("Pong".to_string())));

        let result = registry.invoke("ping", CapabilityArgs::new(), &cancel).await;
        assert_eq!(result, Err(InvokeError::UnknownCapability("ping".to_string())));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_describe_is_sorted() {
        let a = fixed("A", vec!["Zeta", "Alpha"]);
        let registry = CapabilityRegistry::build(&[&a]).unwrap();
        let names: Vec<String> = registry.describe().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
