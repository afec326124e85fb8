//! Error types

/// Errors raised by rule registration, field registration and validation.
///
/// All of these indicate an integration mistake on the caller's side: the
/// operations are deterministic, so retrying with the same input fails the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A rule definition is missing its predicate or message.
    #[error("Rule '{rule}' is invalid: {reason}")]
    InvalidRule { rule: String, reason: String },

    /// A field registration request is malformed.
    #[error("Field '{field}' cannot be registered: {reason}")]
    InvalidField { field: String, reason: String },

    /// The named rule is not registered and no fallback is configured.
    #[error("Rule '{rule}' is not registered and no fallback rule is configured")]
    UnknownRule { rule: String },

    /// No field with this id has been registered.
    #[error("Field '{field}' not found")]
    FieldNotFound { field: String },
}

impl FormError {
    /// Creates a new invalid rule error.
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new unknown rule error.
    pub fn unknown_rule(rule: impl Into<String>) -> Self {
        Self::UnknownRule { rule: rule.into() }
    }

    /// Creates a new field not found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = FormError::invalid_rule("zip", "missing predicate");
        let display = err.to_string();
        assert!(display.contains("zip"));
        assert!(display.contains("missing predicate"));

        let err = FormError::field_not_found("email");
        assert_eq!(err.to_string(), "Field 'email' not found");
    }
}
