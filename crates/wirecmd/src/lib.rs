//! Textual command protocol primitives.
//!
//! A statement such as `-app=script name=migration --class one` is turned
//! into a [`Command`]: an ordered list of [`Argument`]s, each carrying the
//! literal token text and a value inferred as an unsigned or signed integer,
//! a float, a boolean or, failing all of those, a string.
//!
//! ```
//! use wirecmd::{ArgumentType, Command};
//!
//! let command = Command::parse(b"web -repeat=2 always true");
//! assert_eq!(command.to_string(), "web repeat 2 always true");
//! assert_eq!(command.arguments()[2].kind(), ArgumentType::Uint);
//! ```
//!
//! Commands produced by a network listener additionally carry a
//! [`Responder`], through which a handler writes replies back to the peer
//! that sent the statement.

pub mod argument;
pub mod command;
pub mod tokenizer;

pub use argument::{Argument, ArgumentType, ArgumentValue, Arguments};
pub use command::{Command, RespondError, Responder};
pub use tokenizer::{classify, parse, tokenize};
