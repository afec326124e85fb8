//! Built-in rules.
//!
//! [`defaults`] is registered on every new [`Validator`](crate::Validator).
//! The parameterised rules ([`maxlen`], [`minlen`], [`pattern`]) are
//! registered by the application under a name of its choosing.

use std::sync::Arc;

use regex::Regex;
use serde_json::json;

use super::{MessageSource, Rule, RuleDef, SubState};
use crate::error::{FormError, Result};
use crate::value::{self, Value};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const NUMERIC_MESSAGE: &str = "Please enter a number.";

/// Name of the sub-state tracked by [`maxlen`].
pub const CHARACTER_LIMIT: &str = "characterlimit";

fn is_filled(value: &Value) -> bool {
    !value::is_blank(value)
}

/// Non-blank value.
pub fn required() -> RuleDef {
    RuleDef::new().message(REQUIRED_MESSAGE).validate(is_filled)
}

/// The `required` rule, built. Used as the default fallback.
pub fn required_rule() -> Rule {
    Rule {
        name: "required".to_string(),
        message: MessageSource::from(REQUIRED_MESSAGE),
        predicate: Arc::new(is_filled),
        equality: None,
        data: None,
        states: Vec::new(),
    }
}

/// Empty, or a syntactically valid email address.
pub fn email() -> RuleDef {
    RuleDef::new().message(EMAIL_MESSAGE).validate(|v| {
        if value::is_blank(v) {
            true // use `required` for non-empty
        } else {
            email_address::EmailAddress::is_valid(value::as_text(v).trim())
        }
    })
}

/// Empty, a JSON number, or text that parses as one.
pub fn numeric() -> RuleDef {
    RuleDef::new().message(NUMERIC_MESSAGE).validate(|v| match v {
        Value::Number(_) => true,
        Value::String(s) => s.trim().is_empty() || s.trim().parse::<f64>().is_ok(),
        Value::Null => true,
        _ => false,
    })
}

/// Always valid. Useful for fields tracked only for dirty/touched state.
pub fn any() -> RuleDef {
    RuleDef::new().message("").validate(|_| true)
}

/// Length limit reported as a warning instead of an error.
///
/// The value stays valid; the `characterlimit` sub-state turns false once the
/// value is longer than `limit`, and its message reports the remaining
/// characters (negative when over).
pub fn maxlen(limit: usize) -> RuleDef {
    RuleDef::new()
        .message("")
        .validate(|_| true)
        .data(json!(limit))
        .state(
            CHARACTER_LIMIT,
            SubState::new(|v, _prev, data| within_limit(v, data)).with_message(
                MessageSource::computed(|args| {
                    let limit = args.data.and_then(Value::as_u64).unwrap_or(u64::MAX);
                    let remaining = limit as i64 - value::char_len(args.value) as i64;
                    format!("{} characters remaining.", remaining)
                }),
            ),
        )
}

fn within_limit(value: &Value, data: &Value) -> bool {
    match data.as_u64() {
        Some(limit) => value::char_len(value) as u64 <= limit,
        None => true,
    }
}

/// Minimum length in characters. Empty values pass; pair with `required`.
pub fn minlen(min: usize) -> RuleDef {
    RuleDef::new()
        .message(format!("Please enter at least {} characters.", min))
        .validate(move |v| value::is_blank(v) || value::char_len(v) >= min)
}

/// Empty, or text matching `pattern`.
pub fn pattern(pattern: &str, message: impl Into<MessageSource>) -> Result<RuleDef> {
    let re = Regex::new(pattern).map_err(|e| {
        FormError::invalid_rule("pattern", format!("bad pattern '{}': {}", pattern, e))
    })?;
    Ok(RuleDef::new()
        .message(message)
        .validate(move |v| value::is_blank(v) || re.is_match(&value::as_text(v))))
}

/// Rules every validator starts with.
pub fn defaults() -> Vec<(&'static str, RuleDef)> {
    vec![
        ("required", required()),
        ("email", email()),
        ("numeric", numeric()),
        ("any", any()),
    ]
}
