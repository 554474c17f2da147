use crate::config::toml_config::{AgentConfig, LogFormat};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every binary. Values given here override the TOML file.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the ViaCEP-compatible service
    #[arg(long)]
    pub base_url: Option<String>,

    /// Outbound request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header sent with lookups
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl CommonArgs {
    /// Loads the file (or defaults), applies flag overrides and validates the result.
    pub fn resolve(&self) -> Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::from_file(path)?,
            None => AgentConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.lookup.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.lookup.timeout_seconds = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.lookup.user_agent = user_agent.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[lookup]\nbase_url = \"https://file.example.com/\"\ntimeout_seconds = 5\n")
            .unwrap();

        let args = CommonArgs {
            config: Some(temp_file.path().to_path_buf()),
            timeout_seconds: Some(7),
            log_format: Some(LogFormat::Json),
            ..CommonArgs::default()
        };

        let config = args.resolve().unwrap();
        assert_eq!(config.lookup.base_url, "https://file.example.com/");
        assert_eq!(config.lookup.timeout_seconds, 7);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let args = CommonArgs {
            base_url: Some("not a url".to_string()),
            ..CommonArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
