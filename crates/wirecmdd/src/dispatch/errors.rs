//! Error types for the dispatcher.

use std::io;

use thiserror::Error;

use wirecmd_config::EndpointParseError;

use crate::transport::ListenerError;

/// Errors that stop the dispatcher. Returned from [`super::serve`] and
/// [`super::Dispatcher::run`].
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listen address could not be parsed.
    #[error("invalid listen address '{address}': {source}")]
    InvalidAddress {
        /// Address as supplied.
        address: String,
        /// Parse failure.
        #[source]
        source: EndpointParseError,
    },
    /// The listening socket could not be opened.
    #[error("failed to open listener: {0}")]
    Listener(#[from] ListenerError),
    /// Accepting a connection failed; the dispatcher stops.
    #[error("failed to accept connection on {endpoint}: {source}")]
    Accept {
        /// Endpoint the listener was bound to.
        endpoint: String,
        /// Accept failure.
        #[source]
        source: io::Error,
    },
}

/// Reasons a connection task ends early. These are logged and close the
/// affected connection only.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A second handle to the socket could not be created.
    #[error("failed to duplicate connection handle: {0}")]
    Duplicate(#[source] io::Error),
    /// Reading the next record failed.
    #[error("failed to read from connection: {0}")]
    Read(#[source] io::Error),
    /// A record exceeded the configured size limit.
    #[error("record exceeds {max_bytes} byte limit")]
    RecordTooLarge {
        /// Configured limit.
        max_bytes: usize,
    },
    /// The handler panicked while processing a statement.
    #[error("command handler panicked: {message}")]
    HandlerPanicked {
        /// Panic payload rendered as text.
        message: String,
    },
}
