//! Coloured operator notices echoed back to clients.

use tracing::{error, info, warn};

use wirecmd::Command;

const NOTICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::notice");

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_CYAN: &str = "\x1b[36m";

/// Severity of a notice; selects both the log level and the colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Logged at `info`, rendered green.
    Success,
    /// Logged at `warn`, rendered cyan.
    Attention,
    /// Logged at `error`, rendered red.
    Fail,
}

impl Notice {
    fn colour(self) -> &'static str {
        match self {
            Self::Success => ANSI_GREEN,
            Self::Attention => ANSI_CYAN,
            Self::Fail => ANSI_RED,
        }
    }

    /// Wire form of `message`: colour, message, reset, newline.
    #[must_use]
    pub fn render(self, message: &str) -> String {
        format!("{}{message}{ANSI_RESET}\n", self.colour())
    }

    /// Logs `message` and responds with it to every command in `commands`.
    ///
    /// A failed response is logged and otherwise ignored so the remaining
    /// commands still receive the notice.
    pub fn emit(self, message: &str, commands: &[&Command]) {
        match self {
            Self::Success => info!(target: NOTICE_TARGET, "{message}"),
            Self::Attention => warn!(target: NOTICE_TARGET, "{message}"),
            Self::Fail => error!(target: NOTICE_TARGET, "{message}"),
        }

        let payload = self.render(message);
        for command in commands {
            if let Err(error) = command.respond(payload.as_bytes()) {
                warn!(
                    target: NOTICE_TARGET,
                    command = %command,
                    %error,
                    "failed to deliver notice"
                );
            }
        }
    }
}
