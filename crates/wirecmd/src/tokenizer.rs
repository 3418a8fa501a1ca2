//! Single-pass tokenizer for raw command statements.
//!
//! A statement is split on whitespace and `=`; a run of `-` at the start of a
//! token is dropped, so `-app=script --class one` and `app script class one`
//! tokenize identically. Dashes inside a token (`some-goods-1`) are kept.
//!
//! Each token is classified by the first matching entry of [`CLASSIFIERS`],
//! falling back to a string. Unsigned integers are tried before signed ones,
//! so a bare `2` is always a [`ArgumentValue::Uint`].

use crate::argument::{Argument, ArgumentValue, Arguments};
use crate::command::Command;

const SEPARATORS: &[u8] = b" \t\r\n=";
const DASH: u8 = b'-';

/// Fallible classifier for a closed token.
type Classifier = fn(&str) -> Option<ArgumentValue>;

/// Classification precedence, evaluated top to bottom.
const CLASSIFIERS: [Classifier; 4] = [
    classify_uint,
    classify_int,
    classify_float,
    classify_bool,
];

/// Parses a raw statement into a [`Command`]. Never fails.
#[must_use]
pub fn parse(raw: &[u8]) -> Command {
    Command::new(tokenize(raw), raw.to_vec())
}

/// Splits a raw statement into typed arguments.
#[must_use]
pub fn tokenize(raw: &[u8]) -> Arguments {
    let mut arguments = Arguments::new();
    let mut word = Vec::new();
    for &byte in raw {
        if SEPARATORS.contains(&byte) {
            close_word(&mut word, &mut arguments);
        } else if byte == DASH && word.is_empty() {
            continue;
        } else {
            word.push(byte);
        }
    }
    close_word(&mut word, &mut arguments);
    arguments
}

/// Infers the typed value of a single token.
#[must_use]
pub fn classify(token: &str) -> ArgumentValue {
    CLASSIFIERS
        .iter()
        .find_map(|classifier| classifier(token))
        .unwrap_or_else(|| ArgumentValue::String(token.to_owned()))
}

fn close_word(word: &mut Vec<u8>, arguments: &mut Arguments) {
    if word.is_empty() {
        return;
    }
    let name = String::from_utf8_lossy(word).into_owned();
    word.clear();
    let value = classify(&name);
    arguments.push(Argument::new(name, value));
}

fn classify_uint(token: &str) -> Option<ArgumentValue> {
    // `u64::from_str` tolerates a leading `+`; unsigned tokens are digits only.
    if token.is_empty() || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().map(ArgumentValue::Uint)
}

fn classify_int(token: &str) -> Option<ArgumentValue> {
    token.parse().ok().map(ArgumentValue::Int)
}

/// Literal infinities and NaN stay floats; an overflowing exponent does not.
fn classify_float(token: &str) -> Option<ArgumentValue> {
    let value: f64 = token.parse().ok()?;
    if value.is_finite() || is_non_finite_literal(token) {
        Some(ArgumentValue::Float(value))
    } else {
        None
    }
}

fn is_non_finite_literal(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|literal| unsigned.eq_ignore_ascii_case(literal))
}

fn classify_bool(token: &str) -> Option<ArgumentValue> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(ArgumentValue::Bool(true)),
        "false" | "f" | "0" => Some(ArgumentValue::Bool(false)),
        _ => None,
    }
}
