use crate::utils::error::{AgentError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AgentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AgentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("lookup.base_url", "https://viacep.com.br/").is_ok());
        assert!(validate_url("lookup.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("lookup.base_url", "").is_err());
        assert!(validate_url("lookup.base_url", "viacep.com.br").is_err());
        assert!(validate_url("lookup.base_url", "ftp://viacep.com.br").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("lookup.timeout_seconds", 10u64, 1, 120).is_ok());
        assert!(validate_range("lookup.timeout_seconds", 0u64, 1, 120).is_err());
        assert!(validate_range("lookup.timeout_seconds", 121u64, 1, 120).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("lookup.user_agent", "cep-agent/0.1").is_ok());
        assert!(validate_non_empty_string("lookup.user_agent", "   ").is_err());
    }
}
