//! Tracked fields and their validation state.

mod store;

pub use store::FieldStore;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One or more group names a field belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GroupsRepr", into = "GroupsRepr")]
pub struct Groups(Vec<String>);

impl Groups {
    pub fn contains(&self, group: &str) -> bool {
        self.0.iter().any(|g| g == group)
    }
}

impl From<&str> for Groups {
    fn from(group: &str) -> Self {
        Self(vec![group.to_string()])
    }
}

impl From<String> for Groups {
    fn from(group: String) -> Self {
        Self(vec![group])
    }
}

impl From<Vec<String>> for Groups {
    fn from(groups: Vec<String>) -> Self {
        Self(groups)
    }
}

impl<const N: usize> From<[&str; N]> for Groups {
    fn from(groups: [&str; N]) -> Self {
        Self(groups.iter().map(|g| g.to_string()).collect())
    }
}

/// Accepts `"group"` as well as `["a", "b"]` when deserializing.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GroupsRepr {
    One(String),
    Many(Vec<String>),
}

impl From<GroupsRepr> for Groups {
    fn from(repr: GroupsRepr) -> Self {
        match repr {
            GroupsRepr::One(group) => Self(vec![group]),
            GroupsRepr::Many(groups) => Self(groups),
        }
    }
}

impl From<Groups> for GroupsRepr {
    fn from(groups: Groups) -> Self {
        let mut groups = groups.0;
        if groups.len() == 1 {
            GroupsRepr::One(groups.remove(0))
        } else {
            GroupsRepr::Many(groups)
        }
    }
}

/// Field registration request, built by the UI integration from a bound input.
///
/// # Example
///
/// ```
/// use formstate::field::FieldSpec;
///
/// let spec = FieldSpec::new("email", "")
///     .title("Email")
///     .rule("required")
///     .group(["signup", "contact"]);
/// assert_eq!(spec.id, "email");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default, alias = "ruleName")]
    pub rule: Option<String>,
    #[serde(default)]
    pub group: Option<Groups>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn group(mut self, group: impl Into<Groups>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A registered field.
///
/// Derived state (`dirty`, `touched`, `valid`, sub-states) is only written by
/// the [`Validator`](crate::Validator); everything here is read-only to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    id: String,
    title: Option<String>,
    rule: String,
    group: Option<Groups>,
    pub(crate) value: Value,
    pub(crate) initial_value: Value,
    pub(crate) dirty: bool,
    pub(crate) touched: bool,
    pub(crate) valid: Option<bool>,
    pub(crate) states: Vec<(String, bool)>,
    data: Option<Value>,
    pub(crate) uses_fallback: bool,
}

impl Field {
    /// Create a pristine field from a registration request.
    ///
    /// `rule` is the resolved rule name and `data` the auxiliary data the rule
    /// computed for this field.
    pub fn new(spec: &FieldSpec, rule: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.title.clone(),
            rule: rule.into(),
            group: spec.group.clone(),
            value: spec.value.clone(),
            initial_value: spec.value.clone(),
            dirty: false,
            touched: false,
            valid: None,
            states: Vec::new(),
            data,
            uses_fallback: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title, falling back to the id.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn group(&self) -> Option<&Groups> {
        self.group.as_ref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn initial_value(&self) -> &Value {
        &self.initial_value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// `None` until the field has been validated once.
    pub fn valid(&self) -> Option<bool> {
        self.valid
    }

    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// Result of a named sub-state from the last validation pass.
    pub fn state(&self, name: &str) -> Option<bool> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, on)| on)
    }

    /// All sub-state results in rule declaration order.
    pub fn states(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(n, on)| (n.as_str(), *on))
    }

    /// Whether the requested rule was missing at registration, binding the
    /// field to the fallback rule.
    pub fn uses_fallback(&self) -> bool {
        self.uses_fallback
    }

    /// Auxiliary data computed by the rule at registration.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Whether this field is in scope for a group filter. `None` matches all.
    pub fn in_group(&self, group: Option<&str>) -> bool {
        match (group, &self.group) {
            (None, _) => true,
            (Some(wanted), Some(groups)) => groups.contains(wanted),
            (Some(_), None) => false,
        }
    }
}
