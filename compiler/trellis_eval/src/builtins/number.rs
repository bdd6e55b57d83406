use trellis_core::{Conformance, Environment, SourceLocation, Text, Trait, Value};

use crate::keys;

/// Numeric literal. Has no `Evaluate` trait, so it evaluates to itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number(pub f64);

impl Number {
    pub fn into_trait(self) -> Trait<Number> {
        Trait::constant(keys::number(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }
}

pub(crate) fn register(env: &mut Environment) {
    // Number ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::number().validation(),
        |Number(number), _, _| Ok(Text::new(number.to_string())),
    ));
}
