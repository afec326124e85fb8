//! Re-render notifications.
//!
//! After each validation pass the [`Validator`](crate::Validator) calls every
//! matching [`Observer`] synchronously, so the host UI can mark the bound
//! component stale and re-render it. When class signals are enabled the
//! update also carries a [`ClassSet`] the integration can apply to the
//! element.

use std::fmt;

use crate::field::Field;
use crate::message::Message;

/// Snapshot delivered to observers after a field is revalidated.
#[derive(Debug, Clone, Copy)]
pub struct FieldUpdate<'a> {
    pub field: &'a Field,
    pub messages: &'a [Message],
    /// Present only when `apply_classes` is enabled.
    pub classes: Option<&'a ClassSet>,
}

/// Receives field updates.
pub trait Observer {
    fn notify(&self, update: &FieldUpdate<'_>);
}

impl<F> Observer for F
where
    F: Fn(&FieldUpdate<'_>),
{
    fn notify(&self, update: &FieldUpdate<'_>) {
        self(update)
    }
}

/// CSS-class-style names describing a field's state.
///
/// Contains `valid` or `invalid` (once validated), `pristine` or `dirty`,
/// `touched` or `untouched`, followed by the names of sub-states that are
/// currently true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    classes: Vec<String>,
}

impl ClassSet {
    pub fn for_field(field: &Field) -> Self {
        let mut classes = Vec::new();
        match field.valid() {
            Some(true) => classes.push("valid".to_string()),
            Some(false) => classes.push("invalid".to_string()),
            None => {}
        }
        classes.push(if field.is_dirty() { "dirty" } else { "pristine" }.to_string());
        classes.push(if field.is_touched() { "touched" } else { "untouched" }.to_string());
        classes.extend(
            field
                .states()
                .filter(|&(_, on)| on)
                .map(|(name, _)| name.to_string()),
        );
        Self { classes }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.classes.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use serde_json::json;

    #[test]
    fn test_classes_for_unvalidated_field() {
        let field = Field::new(&FieldSpec::new("a", ""), "any", None);
        assert_eq!(ClassSet::for_field(&field).to_string(), "pristine untouched");
    }

    #[test]
    fn test_classes_include_true_states() {
        let mut field = Field::new(&FieldSpec::new("a", ""), "any", None);
        field.valid = Some(false);
        field.dirty = true;
        field.touched = true;
        field.states = vec![("characterlimit".to_string(), true), ("warn".to_string(), false)];
        field.value = json!("x");

        let classes = ClassSet::for_field(&field);
        assert_eq!(classes.to_string(), "invalid dirty touched characterlimit");
        assert!(!classes.contains("warn"));
    }
}
