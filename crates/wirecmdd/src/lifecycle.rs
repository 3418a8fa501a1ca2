//! Structured reporting for daemon and connection lifecycle events.

use std::io;
use std::sync::Arc;

use wirecmd::Command;
use wirecmd_config::{Config, ListenEndpoint};

use crate::bootstrap::BootstrapError;
use crate::dispatch::ConnectionError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle events to telemetry sinks.
///
/// Connection events are raised from connection threads, so implementations
/// must be thread-safe.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the accept loop starts on `endpoint`.
    fn listener_bound(&self, endpoint: &ListenEndpoint);

    /// Invoked when the accept loop stops on an accept failure.
    fn accept_failed(&self, error: &io::Error);

    /// Invoked on the connection thread before the first read.
    fn connection_opened(&self, peer: &str);

    /// Invoked when a handler panics while processing `command`.
    fn handler_panicked(&self, peer: &str, command: &Command, message: &str);

    /// Invoked after a connection has been shut down. `error` is `None` when
    /// the peer closed the stream.
    fn connection_closed(&self, peer: &str, error: Option<&ConnectionError>);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_bound(&self, endpoint: &ListenEndpoint) {
        (**self).listener_bound(endpoint);
    }

    fn accept_failed(&self, error: &io::Error) {
        (**self).accept_failed(error);
    }

    fn connection_opened(&self, peer: &str) {
        (**self).connection_opened(peer);
    }

    fn handler_panicked(&self, peer: &str, command: &Command, message: &str) {
        (**self).handler_panicked(peer, command, message);
    }

    fn connection_closed(&self, peer: &str, error: Option<&ConnectionError>) {
        (**self).connection_closed(peer, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            log_filter = config.log_filter(),
            log_format = %config.log_format(),
            max_record_bytes = config.max_record_bytes(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn listener_bound(&self, endpoint: &ListenEndpoint) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "listener_bound",
            endpoint = %endpoint,
            "listening for commands"
        );
    }

    fn accept_failed(&self, error: &io::Error) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "accept_failed",
            error = %error,
            "accept failed; stopping listener"
        );
    }

    fn connection_opened(&self, peer: &str) {
        tracing::debug!(
            target: LIFECYCLE_TARGET,
            event = "connection_opened",
            peer,
            "client connected"
        );
    }

    fn handler_panicked(&self, peer: &str, command: &Command, message: &str) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "handler_panicked",
            peer,
            command = %command,
            panic = message,
            "command processor error"
        );
    }

    fn connection_closed(&self, peer: &str, error: Option<&ConnectionError>) {
        match error {
            None => tracing::info!(
                target: LIFECYCLE_TARGET,
                event = "connection_closed",
                peer,
                "client connection closed"
            ),
            Some(error) => tracing::warn!(
                target: LIFECYCLE_TARGET,
                event = "connection_closed",
                peer,
                error = %error,
                "client connection closed after error"
            ),
        }
    }
}
