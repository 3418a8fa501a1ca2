//! Parsed commands and the responder they write replies through.

use std::borrow::Cow;
use std::fmt;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::argument::Arguments;
use crate::tokenizer;

/// Write half of a peer connection, bound to a command while it is handled.
pub trait Responder: Send + Sync {
    /// Writes an opaque payload to the peer.
    fn respond(&self, payload: &[u8]) -> io::Result<()>;
}

/// Errors surfaced when replying to a command.
#[derive(Debug, Error)]
pub enum RespondError {
    /// The bound responder failed to write the payload.
    #[error("failed to write command response: {source}")]
    Io {
        /// Underlying write error.
        #[source]
        source: io::Error,
    },
}

/// One parsed statement.
///
/// The argument list is fixed at construction. The only mutable part is the
/// responder slot, which the dispatcher fills while the handler runs. The
/// command never owns the connection behind it: replies to an unbound command
/// are dropped, and replies to a closed peer return an error.
pub struct Command {
    arguments: Arguments,
    origin: Vec<u8>,
    responder: RwLock<Option<Arc<dyn Responder>>>,
}

impl Command {
    /// Builds an unbound command.
    #[must_use]
    pub fn new(arguments: Arguments, origin: Vec<u8>) -> Self {
        Self {
            arguments,
            origin,
            responder: RwLock::new(None),
        }
    }

    /// Tokenizes a raw statement. See [`tokenizer::parse`].
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        tokenizer::parse(raw)
    }

    /// Arguments in statement order.
    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Raw bytes the command was parsed from.
    #[must_use]
    pub fn origin(&self) -> &[u8] {
        &self.origin
    }

    /// Raw statement as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn origin_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.origin)
    }

    /// Routes subsequent replies to `responder`, replacing any previous one.
    pub fn bind_responder(&self, responder: Arc<dyn Responder>) {
        *self
            .responder
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(responder);
    }

    /// Detaches the responder; later replies become no-ops.
    pub fn unbind_responder(&self) {
        *self
            .responder
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a responder is currently bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.responder
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Writes `payload` to the bound responder.
    ///
    /// # Errors
    ///
    /// Returns [`RespondError::Io`] when the write fails. An unbound command
    /// succeeds without writing anything.
    pub fn respond(&self, payload: &[u8]) -> Result<(), RespondError> {
        let guard = self
            .responder
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(responder) = guard.as_ref() else {
            return Ok(());
        };
        responder
            .respond(payload)
            .map_err(|source| RespondError::Io { source })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, name) in self.arguments.names().enumerate() {
            if index > 0 {
                formatter.write_str(" ")?;
            }
            formatter.write_str(name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Command")
            .field("arguments", &self.arguments)
            .field("origin", &self.origin_lossy())
            .field("bound", &self.is_bound())
            .finish()
    }
}
