//! Statement dispatch for accepted connections.
//!
//! Every accepted connection gets its own thread. The thread reads
//! newline-delimited records, splits each record on `;` into statements,
//! tokenizes each statement into a [`wirecmd::Command`] and hands it to the
//! [`CommandHandler`] with a responder bound to the originating connection.
//!
//! ```text
//! Reading --record--> Dispatching --handler returns--> Reading
//!    |                    |
//!    | EOF / read error   | handler panic
//!    v                    v
//!  Closed <---------------+
//! ```
//!
//! Statements from one connection run strictly in order. Connections run
//! independently of each other; a failing or panicking connection is closed
//! without affecting the accept loop. Only a failed `accept` stops the
//! dispatcher, and that error is returned to the caller.

mod connection;
mod errors;
mod framing;
mod handler;
mod server;
#[cfg(test)]
mod server_tests;

pub use self::errors::{ConnectionError, ServeError};
pub use self::handler::CommandHandler;
pub use self::server::{Dispatcher, serve};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
