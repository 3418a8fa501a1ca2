//! Application hook invoked for every parsed statement.

use wirecmd::Command;

/// Processes commands received by the dispatcher.
///
/// The handler runs on the connection's own thread, once per statement, and
/// may reply any number of times through [`Command::respond`]. The command's
/// responder is unbound as soon as `handle` returns, so it must not be kept.
pub trait CommandHandler: Send + Sync + 'static {
    /// Handles a single command.
    fn handle(&self, command: &Command);
}

impl<F> CommandHandler for F
where
    F: Fn(&Command) + Send + Sync + 'static,
{
    fn handle(&self, command: &Command) {
        self(command);
    }
}
