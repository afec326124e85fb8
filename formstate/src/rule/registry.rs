//! Registry of named rules.

use std::collections::HashMap;

use log::{debug, warn};

use super::{Rule, RuleDef};
use crate::error::{FormError, Result};

/// Stores rule definitions by name, with an optional fallback rule.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Rule>,
    fallback: Option<Rule>,
}

impl RuleRegistry {
    /// Create an empty registry without a fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given fallback.
    pub fn with_fallback(fallback: Option<Rule>) -> Self {
        Self {
            rules: HashMap::new(),
            fallback,
        }
    }

    /// Check and store a rule, replacing any rule with the same name.
    pub fn register(&mut self, name: impl Into<String>, def: RuleDef) -> Result<()> {
        let name = name.into();
        let rule = def.build(name.as_str()).inspect_err(|e| {
            warn!("Rejected rule registration: {}", e);
        })?;
        self.insert(rule);
        Ok(())
    }

    /// Register many rules at once.
    ///
    /// A malformed definition only affects itself; every well-formed rule is
    /// stored and the failures are returned together.
    pub fn register_all<I, K>(&mut self, defs: I) -> std::result::Result<(), Vec<FormError>>
    where
        I: IntoIterator<Item = (K, RuleDef)>,
        K: Into<String>,
    {
        let errors: Vec<FormError> = defs
            .into_iter()
            .filter_map(|(name, def)| self.register(name, def).err())
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Store an already built rule under its own name.
    pub fn insert(&mut self, rule: Rule) {
        if self.rules.contains_key(rule.name()) {
            debug!("Replacing rule '{}'", rule.name());
        } else {
            debug!("Registered rule '{}'", rule.name());
        }
        self.rules.insert(rule.name().to_string(), rule);
    }

    /// Look up a rule, merged over the fallback.
    ///
    /// Unknown names resolve to the fallback itself. Without a fallback,
    /// unknown names fail with [`FormError::UnknownRule`].
    pub fn resolve(&self, name: &str) -> Result<Rule> {
        match (self.rules.get(name), &self.fallback) {
            (Some(rule), Some(fallback)) => Ok(rule.clone().merged_over(fallback)),
            (Some(rule), None) => Ok(rule.clone()),
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(FormError::unknown_rule(name)),
        }
    }

    /// Whether a rule with this exact name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn fallback(&self) -> Option<&Rule> {
        self.fallback.as_ref()
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
