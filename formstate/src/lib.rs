//! Form validation state for reactive UIs.
//!
//! `formstate` tracks a set of input fields, runs pluggable rules against
//! their values and keeps human-readable messages up to date. A UI
//! integration registers fields as inputs mount, feeds value changes to
//! [`Validator::validate`], and re-renders from the [`observer`] updates.
//!
//! # Example
//!
//! ```
//! use formstate::prelude::*;
//!
//! let mut validator = Validator::new();
//! validator.add_rule("bio", builtin::maxlen(10)).unwrap();
//!
//! validator
//!     .register_field(FieldSpec::new("email", "").rule("required").group("signup"))
//!     .unwrap();
//! validator
//!     .register_field(FieldSpec::new("bio", "hello").rule("bio").group("signup"))
//!     .unwrap();
//!
//! validator.validate("bio", "this is too long").unwrap();
//! assert_eq!(
//!     validator.message("bio", builtin::CHARACTER_LIMIT).unwrap().text,
//!     "-6 characters remaining."
//! );
//! assert!(!validator.validate_all(Some("signup")).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod message;
pub mod observer;
pub mod rule;
pub mod validator;
pub mod value;

pub use config::ValidatorConfig;
pub use error::{FormError, Result};
pub use field::{Field, FieldSpec, Groups};
pub use message::Message;
pub use validator::Validator;

pub mod prelude {
    pub use crate::config::ValidatorConfig;
    pub use crate::error::FormError;
    pub use crate::field::{Field, FieldSpec, Groups};
    pub use crate::message::{INVALID, Message};
    pub use crate::observer::{ClassSet, FieldUpdate, Observer};
    pub use crate::rule::{MessageArgs, MessageSource, Rule, RuleDef, SubState, builtin};
    pub use crate::validator::Validator;
    pub use crate::value::Value;
}
