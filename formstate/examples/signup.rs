//! Drives a validator the way a UI integration would: inputs mount, the
//! user types, and the form is submitted.
//!
//! Run with `cargo run -p formstate --example signup`.

use formstate::prelude::*;
use simplelog::{Config, LevelFilter, SimpleLogger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::init(LevelFilter::Debug, Config::default())?;

    let mut validator = Validator::with_config(ValidatorConfig::new().apply_classes(true));
    validator.add_rule("bio", builtin::maxlen(40))?;
    validator.add_rule(
        "username",
        builtin::pattern(r"^[a-z0-9_]{3,16}$", "3-16 lowercase letters, digits or _.")?,
    )?;

    validator.subscribe(|update: &FieldUpdate<'_>| {
        let classes = update.classes.map(|c| c.to_string()).unwrap_or_default();
        println!("render {:<10} [{}]", update.field.id(), classes);
        for message in update.messages {
            println!("    {}", message);
        }
    });

    // Inputs mount
    for spec in [
        FieldSpec::new("username", "").title("Username").rule("username").group("signup"),
        FieldSpec::new("email", "").title("Email").rule("email").group("signup"),
        FieldSpec::new("bio", "").title("Bio").rule("bio").group(["signup", "profile"]),
    ] {
        validator.register_field(spec)?;
    }

    // User types
    validator.validate("username", "Ada Lovelace")?;
    validator.validate("username", "ada")?;
    validator.validate("email", "ada@example")?;
    validator.validate("bio", "Wrote the first published algorithm for a machine.")?;

    // Submit
    if validator.validate_all(Some("signup"))? {
        println!("submitted");
        validator.reset(Some("signup"))?;
    } else {
        for (field, messages) in validator.all_messages() {
            println!("{} has {} message(s)", field, messages.len());
        }
    }

    Ok(())
}
