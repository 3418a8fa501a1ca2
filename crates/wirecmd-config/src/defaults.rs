use crate::endpoint::ListenEndpoint;

/// Host used when the listen address omits one.
pub const DEFAULT_HOST: &str = "localhost";

/// Port used when the listen address omits one.
pub const DEFAULT_PORT: u16 = 8080;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Longest record, in bytes, accepted from a single connection line.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 64 * 1024;

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default record size limit.
pub fn default_max_record_bytes() -> usize {
    DEFAULT_MAX_RECORD_BYTES
}

/// Endpoint the daemon listens on when nothing else is configured.
pub fn default_listen_endpoint() -> ListenEndpoint {
    ListenEndpoint::tcp(DEFAULT_HOST, DEFAULT_PORT)
}
