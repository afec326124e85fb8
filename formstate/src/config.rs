//! Validator configuration.

use serde::Deserialize;

use crate::rule::{Rule, builtin};

/// Rule name used when a field registration does not name a rule.
pub const DEFAULT_RULE: &str = "default";

/// Options for a [`Validator`](crate::Validator).
///
/// The plain options can be loaded from any serde format; the fallback rule
/// holds closures and is set in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Attach a [`ClassSet`](crate::observer::ClassSet) to every update.
    pub apply_classes: bool,

    /// Revalidate and broadcast every field whenever a new field registers.
    pub initial_validate_all: bool,

    /// Rule name for fields registered without one.
    pub default_rule: String,

    /// Rule used when a field's rule name is not registered.
    /// `None` makes unknown rule names an error.
    #[serde(skip, default = "default_fallback")]
    pub fallback: Option<Rule>,
}

fn default_fallback() -> Option<Rule> {
    Some(builtin::required_rule())
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            apply_classes: false,
            initial_validate_all: false,
            default_rule: DEFAULT_RULE.to_string(),
            fallback: default_fallback(),
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit class signals with each update.
    pub fn apply_classes(mut self, apply: bool) -> Self {
        self.apply_classes = apply;
        self
    }

    /// Revalidate all fields on each new registration.
    pub fn initial_validate_all(mut self, enabled: bool) -> Self {
        self.initial_validate_all = enabled;
        self
    }

    pub fn default_rule(mut self, name: impl Into<String>) -> Self {
        self.default_rule = name.into();
        self
    }

    /// Set the fallback rule.
    pub fn fallback(mut self, rule: Rule) -> Self {
        self.fallback = Some(rule);
        self
    }

    /// Remove the fallback rule.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }
}
