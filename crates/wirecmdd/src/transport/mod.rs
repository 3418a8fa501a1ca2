//! Socket listener for the command endpoint.
//!
//! The transport module binds the configured endpoint and hands accepted
//! connections to the dispatcher as [`ConnectionStream`]s.

mod errors;
mod listener;
mod stream;

pub use self::errors::ListenerError;
pub(crate) use self::listener::SocketListener;
pub(crate) use self::stream::ConnectionStream;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
