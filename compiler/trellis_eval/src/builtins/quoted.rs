//! Quoted values: evaluation yields the inner value untouched.

use trellis_core::{Conformance, Environment, SourceLocation, Text, Trait, Value};

use super::located;
use crate::evaluate::EvaluateFn;
use crate::keys;
use crate::macro_expand::{MacroExpand, MacroExpandFn};

#[derive(Clone, Debug)]
pub struct Quoted(pub Value);

impl Quoted {
    pub fn into_trait(self) -> Trait<Quoted> {
        Trait::constant(keys::quoted(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }
}

pub(crate) fn register(env: &mut Environment) {
    // Quoted ::= Evaluate
    env.add_conformance(Conformance::new(
        keys::evaluate(),
        keys::quoted().validation(),
        |Quoted(inner), _, _| Ok(EvaluateFn::new(move |_, _| Ok(inner.clone()))),
    ));

    // Quoted ::= Macro-Expand
    env.add_conformance(Conformance::new(
        keys::macro_expand(),
        located(keys::quoted()),
        |(Quoted(inner), location): (Quoted, Option<SourceLocation>), _, _| {
            Ok(MacroExpandFn::new(move |parameter, replacement, env, stack| {
                let expanded = if inner.has_trait(keys::macro_expand(), env, stack)? {
                    inner.macro_expand(parameter, replacement, env, stack)?
                } else {
                    inner.clone()
                };
                Ok(Quoted(expanded).into_value(location.clone()))
            }))
        },
    ));

    // Quoted ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::quoted().validation(),
        |Quoted(inner), env, stack| Ok(Text::new(format!("'{}", inner.format(env, stack)))),
    ));
}
