//! Command daemon serving the `wirecmd` text protocol.
//!
//! The daemon binds the endpoint configured through [`wirecmd_config`],
//! accepts connections and feeds every statement a client sends to a
//! [`CommandHandler`]. Handlers answer through the command itself; the reply
//! goes back over the connection the statement arrived on.
//!
//! Embedding the dispatcher needs nothing but an address and a closure:
//!
//! ```no_run
//! use wirecmd::Command;
//!
//! fn main() -> Result<(), wirecmdd::ServeError> {
//!     wirecmdd::serve("127.0.0.1:9000", |command: &Command| {
//!         let _ = command.respond(b"ok\n");
//!     })
//! }
//! ```
//!
//! The `wirecmdd` binary wraps the same dispatcher in a bootstrap sequence:
//! configuration loading, structured telemetry and lifecycle reporting, and
//! serves the built-in [`ConsoleHandler`].

mod bootstrap;
mod console;
pub mod dispatch;
mod lifecycle;
mod notice;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use console::ConsoleHandler;
pub use dispatch::{CommandHandler, ConnectionError, Dispatcher, ServeError, serve};
pub use lifecycle::{LifecycleReporter, StructuredLifecycleReporter};
pub use notice::Notice;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
