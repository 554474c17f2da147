use crate::utils::error::InvokeError;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Arguments as supplied by the caller: by position, by keyword, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl CapabilityArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Matches arguments to the declared parameter names.
    ///
    /// Parameters nobody supplied are left unbound.
    pub(crate) fn bind(
        self,
        capability: &str,
        params: &[String],
    ) -> Result<BoundArgs, InvokeError> {
        let invalid = |reason: String| InvokeError::InvalidArguments {
            capability: capability.to_string(),
            reason,
        };

        if self.positional.len() > params.len() {
            return Err(invalid(format!(
                "expected at most {} positional argument(s), got {}",
                params.len(),
                self.positional.len()
            )));
        }

        let mut values: HashMap<String, Value> = params
            .iter()
            .cloned()
            .zip(self.positional)
            .collect();

        for (name, value) in self.named {
            if !params.contains(&name) {
                return Err(invalid(format!("unknown parameter '{}'", name)));
            }
            if values.contains_key(&name) {
                return Err(invalid(format!("parameter '{}' given twice", name)));
            }
            values.insert(name, value);
        }

        Ok(BoundArgs { values })
    }
}

impl From<Value> for CapabilityArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Array(items) => Self {
                positional: items,
                named: Map::new(),
            },
            Value::Object(named) => Self {
                positional: Vec::new(),
                named,
            },
            scalar => Self::default().arg(scalar),
        }
    }
}

/// Arguments after binding, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: HashMap<String, Value>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Text view of a parameter. Null or missing becomes `None`; numbers and
    /// booleans are rendered as their JSON text.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_bind_positional_and_keyword() {
        let bound = CapabilityArgs::new()
            .arg("01001000")
            .kwarg("verbose", true)
            .bind("lookup", &params(&["cep", "verbose"]))
            .unwrap();
        assert_eq!(bound.text("cep").as_deref(), Some("01001000"));
        assert_eq!(bound.get("verbose"), Some(&json!(true)));
    }

    #[test]
    fn test_bind_missing_parameter_is_unbound() {
        let bound = CapabilityArgs::new().bind("Echo", &params(&["message"])).unwrap();
        assert_eq!(bound.text("message"), None);
    }

    #[test]
    fn test_bind_rejects_mismatches() {
        let p = params(&["message"]);
        assert!(matches!(
            CapabilityArgs::new().arg("a").arg("b").bind("Echo", &p),
            Err(InvokeError::InvalidArguments { .. })
        ));
        assert!(matches!(
            CapabilityArgs::new().kwarg("msg", "a").bind("Echo", &p),
            Err(InvokeError::InvalidArguments { .. })
        ));
        assert!(matches!(
            CapabilityArgs::new().arg("a").kwarg("message", "b").bind("Echo", &p),
            Err(InvokeError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(
            CapabilityArgs::from(json!(["x"])),
            CapabilityArgs::new().arg("x")
        );
        assert_eq!(
            CapabilityArgs::from(json!({"message": "x"})),
            CapabilityArgs::new().kwarg("message", "x")
        );
        assert_eq!(CapabilityArgs::from(Value::Null), CapabilityArgs::new());
        assert_eq!(CapabilityArgs::from(json!(42)), CapabilityArgs::new().arg(42));
    }

    #[test]
    fn test_text_renders_scalars() {
        let bound = CapabilityArgs::new()
            .arg(1001000)
            .bind("lookup", &params(&["cep"]))
            .unwrap();
        assert_eq!(bound.text("cep").as_deref(), Some("1001000"));
    }
}
