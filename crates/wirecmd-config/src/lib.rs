//! Shared configuration for the wirecmd command daemon.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` or `WIRECMD_CONFIG_PATH`), then
//! `WIRECMD_*` environment variables, then command-line flags.

mod defaults;
mod endpoint;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_RECORD_BYTES, DEFAULT_PORT,
    default_listen_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_max_record_bytes,
};
pub use endpoint::{EndpointParseError, ListenEndpoint, SocketPreparationError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WIRECMD")]
pub struct Config {
    /// Socket the command listener binds to.
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: ListenEndpoint,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Longest accepted input record, in bytes.
    #[ortho_config(default = DEFAULT_MAX_RECORD_BYTES)]
    pub max_record_bytes: usize,
}

impl Config {
    /// Endpoint the listener binds to.
    #[must_use]
    pub fn listen(&self) -> &ListenEndpoint {
        &self.listen
    }

    /// Filter expression handed to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Longest accepted input record, in bytes.
    #[must_use]
    pub fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_record_bytes: default_max_record_bytes(),
        }
    }
}
