//! Validation rules.
//!
//! A [`Rule`] bundles the primary predicate, its message, the equality used
//! to decide whether a value changed, optional per-field auxiliary data and
//! any number of named sub-states. Rules are described with a [`RuleDef`],
//! checked once by [`RuleDef::build`], and stored in a [`RuleRegistry`].
//!
//! # Example
//!
//! ```
//! use formstate::rule::{RuleDef, SubState};
//! use formstate::value::char_len;
//!
//! let rule = RuleDef::new()
//!     .message("Too long.")
//!     .validate(|v| char_len(v) <= 140)
//!     .state(
//!         "nearlimit",
//!         SubState::new(|v, _prev, _data| char_len(v) < 120).with_message("Almost full."),
//!     )
//!     .build("tweet")
//!     .unwrap();
//!
//! assert_eq!(rule.name(), "tweet");
//! ```

pub mod builtin;
mod registry;

pub use registry::RuleRegistry;

use std::fmt;
use std::sync::Arc;

use crate::error::{FormError, Result};
use crate::field::FieldSpec;
use crate::value::{self, Value};

/// Primary validity test.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Returns `true` when the two values should be treated as unchanged.
pub type Equality = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Sub-state test over `(value, previous_value, auxiliary_data)`.
pub type StatePredicate = Arc<dyn Fn(&Value, &Value, &Value) -> bool + Send + Sync>;

/// Computes a message from the value being validated.
pub type MessageFn = Arc<dyn Fn(&MessageArgs<'_>) -> String + Send + Sync>;

/// Computes auxiliary data for a field from its initial value and registration.
pub type DataFn = Arc<dyn Fn(&Value, &FieldSpec) -> Value + Send + Sync>;

/// Arguments passed to a computed message.
#[derive(Debug, Clone, Copy)]
pub struct MessageArgs<'a> {
    /// The value just validated.
    pub value: &'a Value,
    /// The value stored before this validation pass.
    pub previous: &'a Value,
    /// The field's auxiliary data. Only set for sub-state messages.
    pub data: Option<&'a Value>,
}

/// Static or computed message text.
#[derive(Clone)]
pub enum MessageSource {
    Text(String),
    Computed(MessageFn),
}

impl MessageSource {
    /// A message computed on every validation pass.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&MessageArgs<'_>) -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Produce the message text for the given arguments.
    pub fn resolve(&self, args: &MessageArgs<'_>) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Computed(f) => f(args),
        }
    }
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for MessageSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Auxiliary per-field data, computed once when a field registers.
#[derive(Clone)]
pub enum AuxData {
    Static(Value),
    Computed(DataFn),
}

impl AuxData {
    /// Evaluate the data for a field being registered.
    pub fn compute(&self, value: &Value, spec: &FieldSpec) -> Value {
        match self {
            Self::Static(data) => data.clone(),
            Self::Computed(f) => f(value, spec),
        }
    }
}

impl fmt::Debug for AuxData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(data) => f.debug_tuple("Static").field(data).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A named auxiliary condition tracked alongside validity.
///
/// When the predicate evaluates to `false` and a message is declared, that
/// message is reported for the field, the same way the primary message is
/// reported for an invalid value.
#[derive(Clone)]
pub struct SubState {
    predicate: StatePredicate,
    message: Option<MessageSource>,
}

impl SubState {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Attach a message reported while this sub-state is false.
    pub fn with_message(mut self, message: impl Into<MessageSource>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn check(&self, value: &Value, previous: &Value, data: &Value) -> bool {
        (self.predicate)(value, previous, data)
    }

    pub fn message(&self) -> Option<&MessageSource> {
        self.message.as_ref()
    }
}

impl fmt::Debug for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubState")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A registered, structurally valid rule.
#[derive(Clone)]
pub struct Rule {
    name: String,
    message: MessageSource,
    predicate: Predicate,
    equality: Option<Equality>,
    data: Option<AuxData>,
    states: Vec<(String, SubState)>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &MessageSource {
        &self.message
    }

    /// Run the primary predicate.
    pub fn is_valid(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    /// Whether `new` counts as unchanged from `old`.
    ///
    /// Uses the rule's comparison when it has one, [`value::default_eq`] otherwise.
    pub fn is_equal(&self, new: &Value, old: &Value) -> bool {
        match &self.equality {
            Some(eq) => eq(new, old),
            None => value::default_eq(new, old),
        }
    }

    /// Sub-states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (&str, &SubState)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }

    pub fn state(&self, name: &str) -> Option<&SubState> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, state)| state)
    }

    /// Compute auxiliary data for a newly registered field.
    pub fn compute_data(&self, value: &Value, spec: &FieldSpec) -> Option<Value> {
        self.data.as_ref().map(|data| data.compute(value, spec))
    }

    /// Shallow merge: gaps in `self` are filled from `fallback`.
    ///
    /// Predicate, message and sub-states are always present on a built rule,
    /// so only the comparison and auxiliary data can be inherited.
    pub(crate) fn merged_over(mut self, fallback: &Rule) -> Rule {
        if self.equality.is_none() {
            self.equality = fallback.equality.clone();
        }
        if self.data.is_none() {
            self.data = fallback.data.clone();
        }
        self
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("custom_equality", &self.equality.is_some())
            .field("data", &self.data)
            .field("states", &self.states)
            .finish()
    }
}

/// Descriptor for a rule before registration.
///
/// Every part is optional here; [`RuleDef::build`] performs the single
/// structural check and rejects definitions without a predicate or message.
#[derive(Clone, Default)]
pub struct RuleDef {
    message: Option<MessageSource>,
    validate: Option<Predicate>,
    comparison: Option<Equality>,
    data: Option<AuxData>,
    states: Vec<(String, SubState)>,
}

impl RuleDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message reported when the value is invalid.
    pub fn message(mut self, message: impl Into<MessageSource>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set a message computed from the current and previous value.
    pub fn message_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&MessageArgs<'_>) -> String + Send + Sync + 'static,
    {
        self.message = Some(MessageSource::computed(f));
        self
    }

    /// Set the primary predicate.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    /// Set the comparison deciding whether `(new, old)` are unchanged.
    pub fn comparison<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.comparison = Some(Arc::new(f));
        self
    }

    /// Attach static auxiliary data.
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(AuxData::Static(data.into()));
        self
    }

    /// Attach auxiliary data computed from the field's initial value.
    pub fn data_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &FieldSpec) -> Value + Send + Sync + 'static,
    {
        self.data = Some(AuxData::Computed(Arc::new(f)));
        self
    }

    /// Add a sub-state. A later state with the same name replaces the earlier
    /// one but keeps its position.
    pub fn state(mut self, name: impl Into<String>, state: SubState) -> Self {
        let name = name.into();
        match self.states.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = state,
            None => self.states.push((name, state)),
        }
        self
    }

    /// Check the definition and produce a rule named `name`.
    pub fn build(self, name: impl Into<String>) -> Result<Rule> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FormError::invalid_rule(name, "rule name is empty"));
        }
        let Some(predicate) = self.validate else {
            return Err(FormError::invalid_rule(name, "missing validate predicate"));
        };
        let Some(message) = self.message else {
            return Err(FormError::invalid_rule(name, "missing message"));
        };

        Ok(Rule {
            name,
            message,
            predicate,
            equality: self.comparison,
            data: self.data,
            states: self.states,
        })
    }
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("message", &self.message)
            .field("has_validate", &self.validate.is_some())
            .field("has_comparison", &self.comparison.is_some())
            .field("data", &self.data)
            .field("states", &self.states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_requires_predicate() {
        let err = RuleDef::new().message("nope").build("broken").unwrap_err();
        assert!(matches!(err, FormError::InvalidRule { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_build_requires_message() {
        let err = RuleDef::new().validate(|_| true).build("broken").unwrap_err();
        assert!(matches!(err, FormError::InvalidRule { .. }));
    }

    #[test]
    fn test_build_rejects_empty_name() {
        let err = RuleDef::new()
            .message("m")
            .validate(|_| true)
            .build("  ")
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidRule { .. }));
    }

    #[test]
    fn test_states_default_empty() {
        let rule = RuleDef::new()
            .message("m")
            .validate(|_| true)
            .build("plain")
            .unwrap();
        assert_eq!(rule.states().count(), 0);
    }

    #[test]
    fn test_duplicate_state_replaces_in_place() {
        let rule = RuleDef::new()
            .message("m")
            .validate(|_| true)
            .state("a", SubState::new(|_, _, _| true))
            .state("b", SubState::new(|_, _, _| true))
            .state("a", SubState::new(|_, _, _| false).with_message("a"))
            .build("r")
            .unwrap();

        let names: Vec<_> = rule.states().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(rule.state("a").unwrap().message().is_some());
    }

    #[test]
    fn test_custom_comparison() {
        let rule = RuleDef::new()
            .message("m")
            .validate(|_| true)
            .comparison(|a, b| value::as_text(a).to_lowercase() == value::as_text(b).to_lowercase())
            .build("ci")
            .unwrap();

        assert!(rule.is_equal(&json!("ABC"), &json!("abc")));
        assert!(!rule.is_equal(&json!("abd"), &json!("abc")));
    }

    #[test]
    fn test_computed_message_sees_previous_value() {
        let source = MessageSource::computed(|args| {
            format!("{} -> {}", value::as_text(args.previous), value::as_text(args.value))
        });
        let text = source.resolve(&MessageArgs {
            value: &json!("new"),
            previous: &json!("old"),
            data: None,
        });
        assert_eq!(text, "old -> new");
    }

    #[test]
    fn test_merged_over_fills_gaps_only() {
        let fallback = RuleDef::new()
            .message("fallback")
            .validate(|_| false)
            .comparison(|_, _| true)
            .data(json!(5))
            .build("fallback")
            .unwrap();
        let rule = RuleDef::new()
            .message("own")
            .validate(|_| true)
            .build("own")
            .unwrap()
            .merged_over(&fallback);

        assert!(rule.is_valid(&json!(null)));
        assert!(rule.is_equal(&json!(1), &json!(2)));
        let spec = FieldSpec::new("f", json!(null));
        assert_eq!(rule.compute_data(&json!(null), &spec), Some(json!(5)));
        assert_eq!(rule.name(), "own");
    }
}
