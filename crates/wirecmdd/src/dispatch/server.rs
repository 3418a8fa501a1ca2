//! Accept loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use wirecmd_config::{DEFAULT_MAX_RECORD_BYTES, ListenEndpoint};

use crate::lifecycle::{LifecycleReporter, StructuredLifecycleReporter};
use crate::transport::{ConnectionStream, SocketListener};

use super::connection::ConnectionTask;
use super::errors::ServeError;
use super::handler::CommandHandler;

/// Parses `address`, binds it and dispatches commands to `handler` until
/// accepting a connection fails.
///
/// `address` is `host:port`; either half may be omitted (`":9000"`,
/// `"localhost:"`) and is then filled with the defaults from
/// [`wirecmd_config`]. `unix:///path` binds a Unix domain socket instead.
///
/// # Errors
///
/// Returns [`ServeError::InvalidAddress`] for an unparsable address,
/// [`ServeError::Listener`] when the socket cannot be opened and
/// [`ServeError::Accept`] when the accept loop stops.
pub fn serve<H>(address: &str, handler: H) -> Result<(), ServeError>
where
    H: CommandHandler,
{
    let endpoint = address
        .parse::<ListenEndpoint>()
        .map_err(|source| ServeError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;
    Dispatcher::bind(&endpoint, Arc::new(handler))?.run()
}

/// A bound listener paired with the handler its connections feed.
pub struct Dispatcher {
    listener: SocketListener,
    handler: Arc<dyn CommandHandler>,
    reporter: Arc<dyn LifecycleReporter>,
    max_record_bytes: usize,
}

impl Dispatcher {
    /// Binds `endpoint` without accepting connections yet.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Listener`] when the socket cannot be opened.
    pub fn bind(
        endpoint: &ListenEndpoint,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Self, ServeError> {
        let listener = SocketListener::bind(endpoint)?;
        Ok(Self {
            listener,
            handler,
            reporter: Arc::new(StructuredLifecycleReporter::new()),
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        })
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the longest record accepted from a connection.
    #[must_use]
    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes;
        self
    }

    /// Endpoint the dispatcher is bound to.
    #[must_use]
    pub fn endpoint(&self) -> &ListenEndpoint {
        self.listener.endpoint()
    }

    /// Bound TCP address, useful when binding port `0`.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until an accept call fails, spawning one thread
    /// per connection.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Accept`]; the listener is closed on return.
    pub fn run(self) -> Result<(), ServeError> {
        accept_connections(
            &self.listener,
            &self.handler,
            &self.reporter,
            self.max_record_bytes,
        )
    }
}

/// Source of accepted connections for the dispatch loop.
pub(crate) trait Acceptor {
    /// Endpoint connections arrive on.
    fn endpoint(&self) -> &ListenEndpoint;

    /// Blocks until the next connection arrives.
    fn accept(&self) -> io::Result<ConnectionStream>;
}

impl Acceptor for SocketListener {
    fn endpoint(&self) -> &ListenEndpoint {
        SocketListener::endpoint(self)
    }

    fn accept(&self) -> io::Result<ConnectionStream> {
        SocketListener::accept(self)
    }
}

/// Runs one connection task per accepted stream until `acceptor` fails.
pub(crate) fn accept_connections(
    acceptor: &impl Acceptor,
    handler: &Arc<dyn CommandHandler>,
    reporter: &Arc<dyn LifecycleReporter>,
    max_record_bytes: usize,
) -> Result<(), ServeError> {
    reporter.listener_bound(acceptor.endpoint());
    loop {
        let stream = match acceptor.accept() {
            Ok(stream) => stream,
            Err(source) => {
                reporter.accept_failed(&source);
                return Err(ServeError::Accept {
                    endpoint: acceptor.endpoint().to_string(),
                    source,
                });
            }
        };

        let task = ConnectionTask::new(
            stream,
            Arc::clone(handler),
            Arc::clone(reporter),
            max_record_bytes,
        );
        thread::spawn(move || task.run());
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("endpoint", self.listener.endpoint())
            .field("max_record_bytes", &self.max_record_bytes)
            .finish_non_exhaustive()
    }
}
