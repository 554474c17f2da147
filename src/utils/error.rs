use thiserror::Error;

/// Why a raw string could not become a `PostalCode`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    #[error("postal code is empty")]
    Empty,

    #[error("postal code must have exactly 8 digits, got {digits}")]
    Malformed { digits: usize },
}

/// Failures an `AddressLookup` implementation may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup cancelled")]
    Cancelled,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected reply from address source: {0}")]
    UnexpectedReply(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Transport(err.to_string())
    }
}

/// Fatal configuration errors raised while building the capability table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("capability '{name}' is declared by both {first} and {second}")]
    DuplicateCapability {
        name: String,
        first: String,
        second: String,
    },

    #[error("provider {provider} declares a capability with an empty name")]
    EmptyName { provider: String },
}

/// Routing-layer failures. Never folded into a business response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("invalid arguments for {capability}: {reason}")]
    InvalidArguments { capability: String, reason: String },

    #[error("capability {capability} failed: {message}")]
    Handler { capability: String, message: String },
}

impl InvokeError {
    /// Stable, machine-readable tag used on the host wire.
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::UnknownCapability(_) => "unknown_capability",
            InvokeError::InvalidArguments { .. } => "invalid_arguments",
            InvokeError::Handler { .. } => "handler_failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Capability registry error: {0}")]
    RegistryError(#[from] RegistryError),
}

impl AgentError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            AgentError::HttpError(_) => "Could not set up the HTTP client".to_string(),
            AgentError::IoError(e) => format!("File or terminal access failed: {}", e),
            AgentError::SerializationError(_) => "Could not encode or decode JSON".to_string(),
            AgentError::ConfigError { message } => format!("Invalid configuration: {}", message),
            AgentError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            AgentError::RegistryError(e) => format!("Capability setup failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AgentError::HttpError(_) => "Check the TLS setup and the configured user agent",
            AgentError::IoError(_) => "Check that the file exists and is readable",
            AgentError::SerializationError(_) => "Check that the input is valid JSON",
            AgentError::ConfigError { .. } => "Check the TOML syntax of the configuration file",
            AgentError::InvalidConfigValueError { .. } => {
                "Fix the configuration value or override it on the command line"
            }
            AgentError::RegistryError(_) => "Give every capability a unique, non-empty name",
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
