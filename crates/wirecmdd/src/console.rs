//! Built-in command set served by the `wirecmdd` binary.

use tracing::warn;

use wirecmd::Command;

use crate::dispatch::CommandHandler;
use crate::notice::Notice;

const CONSOLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::console");

/// Handler answering `ping`, `echo` and `inspect`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHandler;

impl ConsoleHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn echo(command: &Command) -> String {
        let mut reply = command.arguments().names().skip(1).collect::<Vec<_>>().join(" ");
        reply.push('\n');
        reply
    }

    fn inspect(command: &Command) -> String {
        command
            .arguments()
            .iter()
            .skip(1)
            .map(|argument| format!("{}:{}\n", argument.name(), argument.kind()))
            .collect()
    }

    fn reply(command: &Command, payload: &str) {
        if let Err(error) = command.respond(payload.as_bytes()) {
            warn!(
                target: CONSOLE_TARGET,
                command = %command,
                %error,
                "failed to deliver reply"
            );
        }
    }
}

impl CommandHandler for ConsoleHandler {
    fn handle(&self, command: &Command) {
        let verb = command.arguments().first().map(|argument| argument.name());
        match verb {
            Some("ping") => Notice::Success.emit("pong", &[command]),
            Some("echo") => Self::reply(command, &Self::echo(command)),
            Some("inspect") => Self::reply(command, &Self::inspect(command)),
            _ => Notice::Fail.emit(&format!("unknown command: {command}"), &[command]),
        }
    }
}
