//! The validator: ties rules, fields and messages together.
//!
//! Every change to a field's derived state goes through one revalidation
//! routine:
//!
//! 1. resolve the field's rule
//! 2. `dirty` = value differs from the baseline (rule equality)
//! 3. `touched` |= `dirty`
//! 4. `valid` = rule predicate
//! 5. sub-states over `(value, previous, data)`
//! 6. store the new value
//! 7. rebuild and replace the field's messages
//! 8. notify observers

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::config::ValidatorConfig;
use crate::error::{FormError, Result};
use crate::field::{Field, FieldSpec, FieldStore};
use crate::message::{INVALID, Message, MessageStore};
use crate::observer::{ClassSet, FieldUpdate, Observer};
use crate::rule::{MessageArgs, Rule, RuleDef, RuleRegistry, builtin};
use crate::value::Value;

/// The rule a field was bound to when it registered.
///
/// Fields that fell back stay on the fallback even if a rule with their
/// requested name is added later; their auxiliary data came from the fallback.
fn bound_rule(rules: &RuleRegistry, field: &Field) -> Result<Rule> {
    if field.uses_fallback() {
        rules
            .fallback()
            .cloned()
            .ok_or_else(|| FormError::unknown_rule(field.rule()))
    } else {
        rules.resolve(field.rule())
    }
}

struct Subscription {
    field: Option<String>,
    observer: Box<dyn Observer>,
}

/// Validation context for one form (or a whole application).
///
/// Construct one per independent set of fields and hand it to the UI
/// integration points that register and update fields. Calls for the same
/// field must not overlap; the validator is meant to be driven from a single
/// UI thread.
///
/// # Example
///
/// ```
/// use formstate::{FieldSpec, Validator};
///
/// let mut validator = Validator::new();
/// let valid = validator
///     .register_field(FieldSpec::new("email", "").rule("required"))
///     .unwrap();
/// assert!(!valid);
///
/// assert!(validator.validate("email", "a@b.com").unwrap());
/// assert!(validator.field("email").unwrap().is_dirty());
/// ```
pub struct Validator {
    config: ValidatorConfig,
    rules: RuleRegistry,
    fields: FieldStore,
    messages: MessageStore,
    observers: Vec<Subscription>,
}

impl Validator {
    /// Create a validator with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a validator with the built-in rules registered.
    pub fn with_config(config: ValidatorConfig) -> Self {
        let mut rules = RuleRegistry::with_fallback(config.fallback.clone());
        if let Err(errors) = rules.register_all(builtin::defaults()) {
            for error in errors {
                warn!("Built-in rule not registered: {}", error);
            }
        }

        Self {
            config,
            rules,
            fields: FieldStore::new(),
            messages: MessageStore::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Register (or replace) a rule.
    pub fn add_rule(&mut self, name: impl Into<String>, def: RuleDef) -> Result<()> {
        self.rules.register(name, def)
    }

    /// Register several rules; malformed ones are reported and skipped.
    pub fn add_rules<I, K>(&mut self, defs: I) -> std::result::Result<(), Vec<FormError>>
    where
        I: IntoIterator<Item = (K, RuleDef)>,
        K: Into<String>,
    {
        self.rules.register_all(defs)
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Receive updates for every field.
    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Subscription {
            field: None,
            observer: Box::new(observer),
        });
    }

    /// Receive updates for a single field.
    pub fn subscribe_field(&mut self, id: impl Into<String>, observer: impl Observer + 'static) {
        self.observers.push(Subscription {
            field: Some(id.into()),
            observer: Box::new(observer),
        });
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    /// Register a field and validate its initial value.
    ///
    /// Registering an id that already exists changes nothing and returns the
    /// existing field's validity. Returns the new field's validity otherwise.
    ///
    /// With `initial_validate_all`, each new registration also revalidates and
    /// broadcasts every field, so mounting `n` fields sends `O(n²)` updates.
    pub fn register_field(&mut self, spec: FieldSpec) -> Result<bool> {
        if spec.id.trim().is_empty() {
            warn!("Rejected field registration without an id");
            return Err(FormError::invalid_field(&spec.id, "field id is empty"));
        }
        if let Some(existing) = self.fields.get(&spec.id) {
            debug!("Field '{}' already registered", spec.id);
            return Ok(existing.is_valid());
        }

        let rule_name = spec
            .rule
            .clone()
            .unwrap_or_else(|| self.config.default_rule.clone());
        let rule = self.rules.resolve(&rule_name)?;
        let uses_fallback = !self.rules.contains(&rule_name);
        if uses_fallback {
            warn!(
                "Field '{}' uses unregistered rule '{}', falling back to '{}'",
                spec.id,
                rule_name,
                rule.name()
            );
        }

        let data = rule.compute_data(&spec.value, &spec);
        let mut field = Field::new(&spec, rule_name, data);
        field.uses_fallback = uses_fallback;
        self.fields.register(field)?;
        debug!("Registered field '{}' with rule '{}'", spec.id, rule.name());

        let valid = self.revalidate(&spec.id, spec.value)?;
        if self.config.initial_validate_all {
            self.validate_all(None)?;
        }
        Ok(valid)
    }

    /// Remove a field and its messages. Field-scoped observers are dropped too.
    ///
    /// Returns `false` if no such field was registered.
    pub fn remove_field(&mut self, id: &str) -> bool {
        let Some(field) = self.fields.remove(id) else {
            return false;
        };
        self.messages.remove(id);
        self.observers
            .retain(|sub| sub.field.as_deref() != Some(field.id()));
        debug!("Removed field '{}'", id);
        true
    }

    /// Validate a new value for a field.
    ///
    /// A value equal (per the rule) to the currently stored one is not
    /// re-validated; the previous result is returned as is.
    pub fn validate(&mut self, id: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        let field = self
            .fields
            .get(id)
            .ok_or_else(|| FormError::field_not_found(id))?;
        let rule = bound_rule(&self.rules, field)?;

        if field.valid().is_some() && rule.is_equal(&value, field.value()) {
            trace!("Field '{}' unchanged, skipping validation", id);
            return Ok(field.is_valid());
        }

        self.revalidate(id, value)
    }

    /// Revalidate every field in scope with its current value.
    ///
    /// Returns `true` only if every field is valid.
    pub fn validate_all(&mut self, group: Option<&str>) -> Result<bool> {
        let mut all_valid = true;
        for id in self.fields.ids(group) {
            let value = self.current_value(&id)?;
            let valid = self.revalidate(&id, value)?;
            all_valid = all_valid && valid;
        }
        Ok(all_valid)
    }

    /// Make each in-scope field's current value its new baseline.
    ///
    /// Clears `dirty`. `touched` is kept.
    pub fn reset(&mut self, group: Option<&str>) -> Result<()> {
        for id in self.fields.ids(group) {
            let field = self
                .fields
                .get_mut(&id)
                .ok_or_else(|| FormError::field_not_found(&id))?;
            field.initial_value = field.value.clone();
            let value = field.value.clone();
            self.revalidate(&id, value)?;
        }
        Ok(())
    }

    fn current_value(&self, id: &str) -> Result<Value> {
        self.fields
            .get(id)
            .map(|f| f.value().clone())
            .ok_or_else(|| FormError::field_not_found(id))
    }

    fn revalidate(&mut self, id: &str, value: Value) -> Result<bool> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| FormError::field_not_found(id))?;
        let rule = bound_rule(&self.rules, field)?;

        let changed = !rule.is_equal(&value, &field.initial_value);
        field.dirty = changed;
        field.touched = field.touched || changed;

        let valid = rule.is_valid(&value);
        field.valid = Some(valid);

        let data = field.data().cloned().unwrap_or(Value::Null);
        field.states = rule
            .states()
            .map(|(name, state)| (name.to_string(), state.check(&value, &field.value, &data)))
            .collect();

        let previous = std::mem::replace(&mut field.value, value);

        let mut messages = Vec::new();
        if !valid {
            let text = rule.message().resolve(&MessageArgs {
                value: &field.value,
                previous: &previous,
                data: None,
            });
            messages.push(Message::new(INVALID, field.title(), text));
        }
        for (name, state) in rule.states() {
            let Some(message) = state.message() else {
                continue;
            };
            if field.state(name) == Some(false) {
                let text = message.resolve(&MessageArgs {
                    value: &field.value,
                    previous: &previous,
                    data: Some(&data),
                });
                messages.push(Message::new(name, field.title(), text));
            }
        }

        trace!(
            "Validated '{}': valid={} dirty={} touched={} messages={}",
            id,
            valid,
            field.dirty,
            field.touched,
            messages.len()
        );

        self.messages.replace(id, messages);
        self.notify(id);
        Ok(valid)
    }

    fn notify(&self, id: &str) {
        let Some(field) = self.fields.get(id) else {
            return;
        };
        let classes = self.config.apply_classes.then(|| ClassSet::for_field(field));
        let update = FieldUpdate {
            field,
            messages: self.messages.all(id),
            classes: classes.as_ref(),
        };

        for sub in &self.observers {
            if sub.field.as_deref().is_none_or(|f| f == id) {
                sub.observer.notify(&update);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.fields.exists(id)
    }

    /// Fields in registration order, optionally limited to a group.
    pub fn fields(&self, group: Option<&str>) -> Vec<&Field> {
        self.fields.all(group)
    }

    pub fn query_dirty(&self, group: Option<&str>) -> Vec<&Field> {
        self.fields
            .all(group)
            .into_iter()
            .filter(|f| f.is_dirty())
            .collect()
    }

    pub fn query_touched(&self, group: Option<&str>) -> Vec<&Field> {
        self.fields
            .all(group)
            .into_iter()
            .filter(|f| f.is_touched())
            .collect()
    }

    /// Fields whose sub-state `state` is currently true.
    pub fn query_state(&self, state: &str, group: Option<&str>) -> Vec<&Field> {
        self.fields
            .all(group)
            .into_iter()
            .filter(|f| f.state(state) == Some(true))
            .collect()
    }

    /// Whether every in-scope field is currently valid, without revalidating.
    pub fn is_valid(&self, group: Option<&str>) -> bool {
        self.fields.all(group).iter().all(|f| f.is_valid())
    }

    pub fn messages(&self, id: &str) -> &[Message] {
        self.messages.all(id)
    }

    pub fn message(&self, id: &str, state: &str) -> Option<&Message> {
        self.messages.get(id, state)
    }

    pub fn first_message(&self, id: &str) -> Option<&Message> {
        self.messages.first(id)
    }

    /// Messages of every field that currently has any.
    pub fn all_messages(&self) -> BTreeMap<&str, &[Message]> {
        self.messages.all_active()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .field("fields", &self.fields)
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_validates_initial_value() {
        let mut validator = Validator::new();
        let valid = validator
            .register_field(FieldSpec::new("name", "").rule("required"))
            .unwrap();

        assert!(!valid);
        let field = validator.field("name").unwrap();
        assert_eq!(field.valid(), Some(false));
        assert!(!field.is_dirty());
        assert!(!field.is_touched());
        assert_eq!(
            validator.message("name", INVALID).unwrap().text,
            builtin::REQUIRED_MESSAGE
        );
    }

    #[test]
    fn test_register_rejects_empty_id() {
        let mut validator = Validator::new();
        let err = validator.register_field(FieldSpec::new("", "x")).unwrap_err();
        assert!(matches!(err, FormError::InvalidField { .. }));
        assert!(validator.fields(None).is_empty());
    }

    #[test]
    fn test_register_unknown_rule_without_fallback() {
        let mut validator = Validator::with_config(ValidatorConfig::new().without_fallback());
        let err = validator
            .register_field(FieldSpec::new("a", "x").rule("missing"))
            .unwrap_err();
        assert_eq!(err, FormError::unknown_rule("missing"));
        assert!(!validator.has_field("a"));
    }

    #[test]
    fn test_unnamed_rule_uses_fallback() {
        let mut validator = Validator::new();
        assert!(!validator.register_field(FieldSpec::new("a", "")).unwrap());
        assert!(validator.validate("a", "filled").unwrap());
        let field = validator.field("a").unwrap();
        assert_eq!(field.rule(), "default");
        assert!(field.uses_fallback());
    }

    #[test]
    fn test_validate_unknown_field() {
        let mut validator = Validator::new();
        let err = validator.validate("ghost", "x").unwrap_err();
        assert_eq!(err, FormError::field_not_found("ghost"));
        let err = validator.validate("", "x").unwrap_err();
        assert!(matches!(err, FormError::FieldNotFound { .. }));
    }

    #[test]
    fn test_data_computed_once() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut validator = Validator::new();
        validator
            .add_rule(
                "counted",
                RuleDef::new()
                    .message("m")
                    .validate(|_| true)
                    .data_with(move |value, spec| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        json!({"id": spec.id, "initial": value})
                    }),
            )
            .unwrap();

        validator
            .register_field(FieldSpec::new("f", "a").rule("counted"))
            .unwrap();
        validator.validate("f", "b").unwrap();
        validator.validate_all(None).unwrap();
        validator.reset(None).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            validator.field("f").unwrap().data(),
            Some(&json!({"id": "f", "initial": "a"}))
        );
    }

    #[test]
    fn test_state_predicate_sees_previous_value() {
        let mut validator = Validator::new();
        validator
            .add_rule(
                "grow",
                RuleDef::new()
                    .message("m")
                    .validate(|_| true)
                    .state(
                        "growing",
                        crate::rule::SubState::new(|v, prev, _| {
                            v.as_i64().unwrap_or(0) >= prev.as_i64().unwrap_or(0)
                        })
                        .with_message("Value went down."),
                    ),
            )
            .unwrap();

        validator
            .register_field(FieldSpec::new("n", 5).rule("grow"))
            .unwrap();
        validator.validate("n", 7).unwrap();
        assert_eq!(validator.field("n").unwrap().state("growing"), Some(true));

        validator.validate("n", 3).unwrap();
        assert_eq!(validator.field("n").unwrap().state("growing"), Some(false));
        assert_eq!(
            validator.message("n", "growing").unwrap().text,
            "Value went down."
        );
    }

    #[test]
    fn test_remove_field() {
        let mut validator = Validator::new();
        validator
            .register_field(FieldSpec::new("a", "").rule("required"))
            .unwrap();

        assert!(validator.remove_field("a"));
        assert!(!validator.remove_field("a"));
        assert!(validator.messages("a").is_empty());
        assert!(validator.all_messages().is_empty());
        assert!(matches!(
            validator.validate("a", "x"),
            Err(FormError::FieldNotFound { .. })
        ));
    }
}
