//! Configuration types for the rsh relay.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use crate::framing::SENTINEL_INSTRUCTION;
use crate::scan::CompletionTrigger;
use crate::{Error, Result};

/// Relay configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener settings
    pub server: ServerSettings,
    /// Framing and scanning settings
    pub protocol: ProtocolSettings,
}

impl RelayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RelayConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.protocol.validate()
    }
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on (all interfaces by default)
    pub bind_address: String,
    /// Listen backlog
    pub backlog: u32,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            backlog: 1,
            log_level: "info".to_string(),
        }
    }
}

impl ServerSettings {
    /// Parsed bind address.
    pub fn bind_ip(&self) -> Result<IpAddr> {
        self.bind_address.parse().map_err(|_| {
            Error::Config(format!(
                "server.bind_address '{}' is not an IP address",
                self.bind_address
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        self.bind_ip()?;

        if self.backlog == 0 {
            return Err(Error::Config("server.backlog must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Framing and scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolSettings {
    /// Silence timeout for draining the initial prompt, in seconds
    pub prompt_timeout_secs: u64,
    /// Silence timeout while waiting for a command's output, in seconds
    pub reply_timeout_secs: u64,
    /// Maximum length of a framed command in bytes
    pub max_command_len: usize,
    /// Operator line that ends the session once sent
    pub exit_command: String,
    /// What marks the end of a response
    pub completion: CompletionTrigger,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            prompt_timeout_secs: 1,
            reply_timeout_secs: 120,
            max_command_len: crate::MAX_COMMAND_LEN,
            exit_command: "exit\n".to_string(),
            completion: CompletionTrigger::default(),
        }
    }
}

impl ProtocolSettings {
    /// Prompt drain timeout as a [`Duration`].
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Reply timeout as a [`Duration`].
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.prompt_timeout_secs == 0 || self.reply_timeout_secs == 0 {
            return Err(Error::Config(
                "protocol timeouts must be > 0 seconds".to_string(),
            ));
        }

        if self.max_command_len <= SENTINEL_INSTRUCTION.len() {
            return Err(Error::Config(format!(
                "protocol.max_command_len must be > {}",
                SENTINEL_INSTRUCTION.len()
            )));
        }

        if !self.exit_command.ends_with('\n') || self.exit_command.trim().is_empty() {
            return Err(Error::Config(
                "protocol.exit_command must be a non-empty line ending with a newline"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
