//! Per-connection task: read records, dispatch statements, close.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use wirecmd::{Command, Responder};

use crate::lifecycle::LifecycleReporter;
use crate::transport::ConnectionStream;

use super::DISPATCH_TARGET;
use super::errors::ConnectionError;
use super::framing::{RecordReader, split_statements};
use super::handler::CommandHandler;

/// Write half of an accepted connection.
///
/// Writes are serialised so payloads from concurrent `respond` calls never
/// interleave on the wire.
pub(crate) struct ConnectionResponder {
    stream: Mutex<ConnectionStream>,
}

impl ConnectionResponder {
    pub(crate) fn new(stream: ConnectionStream) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }
}

impl Responder for ConnectionResponder {
    fn respond(&self, payload: &[u8]) -> io::Result<()> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| io::Error::other("connection writer lock poisoned"))?;
        stream.write_all(payload)?;
        stream.flush()
    }
}

/// Everything one connection thread needs.
pub(crate) struct ConnectionTask {
    stream: ConnectionStream,
    peer: String,
    handler: Arc<dyn CommandHandler>,
    reporter: Arc<dyn LifecycleReporter>,
    max_record_bytes: usize,
}

impl ConnectionTask {
    pub(crate) fn new(
        stream: ConnectionStream,
        handler: Arc<dyn CommandHandler>,
        reporter: Arc<dyn LifecycleReporter>,
        max_record_bytes: usize,
    ) -> Self {
        let peer = stream.peer();
        Self {
            stream,
            peer,
            handler,
            reporter,
            max_record_bytes,
        }
    }

    /// Serves the connection until EOF, an I/O failure or a handler panic,
    /// then closes it.
    pub(crate) fn run(self) {
        self.reporter.connection_opened(&self.peer);
        let outcome = self.serve();
        if let Err(error) = self.stream.shutdown() {
            debug!(
                target: DISPATCH_TARGET,
                peer = %self.peer,
                %error,
                "connection shutdown failed"
            );
        }
        self.reporter
            .connection_closed(&self.peer, outcome.as_ref().err());
    }

    fn serve(&self) -> Result<(), ConnectionError> {
        let writer = self.stream.try_clone().map_err(ConnectionError::Duplicate)?;
        let responder: Arc<dyn Responder> = Arc::new(ConnectionResponder::new(writer));
        let reader = self.stream.try_clone().map_err(ConnectionError::Duplicate)?;
        let mut records = RecordReader::new(reader, self.max_record_bytes);

        while let Some(record) = records.next_record()? {
            for statement in split_statements(record) {
                self.dispatch(statement, &responder)?;
            }
        }
        Ok(())
    }

    fn dispatch(
        &self,
        statement: &[u8],
        responder: &Arc<dyn Responder>,
    ) -> Result<(), ConnectionError> {
        let command = Command::parse(statement);
        debug!(
            target: DISPATCH_TARGET,
            peer = %self.peer,
            command = %command,
            arguments = command.arguments().len(),
            "dispatching command"
        );

        command.bind_responder(Arc::clone(responder));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(&command)));
        command.unbind_responder();

        outcome.map_err(|payload| {
            let message = panic_message(payload.as_ref());
            warn!(
                target: DISPATCH_TARGET,
                peer = %self.peer,
                command = %command,
                "handler panicked; closing connection"
            );
            self.reporter
                .handler_panicked(&self.peer, &command, &message);
            ConnectionError::HandlerPanicked { message }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
