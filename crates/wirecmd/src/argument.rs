//! Typed arguments produced by the tokenizer.

use std::ops::Deref;
use std::slice;

use strum::{Display, EnumString};

/// Type tag attached to every argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArgumentType {
    /// Free text; the fallback for every token.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    Uint,
    /// 64-bit floating point number.
    Float,
    /// Boolean literal.
    Bool,
}

/// Parsed value of an argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// Text value.
    String(String),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    Uint(u64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl ArgumentValue {
    /// Type tag matching this value.
    #[must_use]
    pub const fn kind(&self) -> ArgumentType {
        match self {
            Self::String(_) => ArgumentType::String,
            Self::Int(_) => ArgumentType::Int,
            Self::Uint(_) => ArgumentType::Uint,
            Self::Float(_) => ArgumentType::Float,
            Self::Bool(_) => ArgumentType::Bool,
        }
    }
}

/// A single token of a command together with its inferred value.
///
/// The name is always the literal token text; the value is what the token
/// was classified as.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    value: ArgumentValue,
}

impl Argument {
    /// Builds an argument from its token text and typed value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: ArgumentValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Literal token text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed value.
    #[must_use]
    pub fn value(&self) -> &ArgumentValue {
        &self.value
    }

    /// Type tag of the parsed value.
    #[must_use]
    pub const fn kind(&self) -> ArgumentType {
        self.value.kind()
    }

    /// Text value, if the argument was classified as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ArgumentValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Signed integer value, if the argument was classified as one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self.value {
            ArgumentValue::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Unsigned integer value, if the argument was classified as one.
    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self.value {
            ArgumentValue::Uint(value) => Some(value),
            _ => None,
        }
    }

    /// Floating point value, if the argument was classified as one.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self.value {
            ArgumentValue::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean value, if the argument was classified as one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self.value {
            ArgumentValue::Bool(value) => Some(value),
            _ => None,
        }
    }
}

/// Ordered argument list of a command. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, argument: Argument) {
        self.0.push(argument);
    }

    /// First argument whose token text equals `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Argument> {
        self.0.iter().find(|argument| argument.name == name)
    }

    /// Token texts in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Argument::name)
    }

    /// Consumes the list, returning the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Argument> {
        self.0
    }
}

impl Deref for Arguments {
    type Target = [Argument];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Argument> for Arguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
