//! Validation messages.

mod store;

pub use store::MessageStore;

use serde::{Deserialize, Serialize};

/// State id used for the primary validity message.
pub const INVALID: &str = "invalid";

/// A human-readable message reported for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// `"invalid"` for the primary message, otherwise the sub-state name.
    pub state: String,
    /// Title of the field the message belongs to.
    pub title: String,
    pub text: String,
}

impl Message {
    pub fn new(state: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.text)
    }
}
