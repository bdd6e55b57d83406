//! Macros: functions that substitute their evaluated argument into a body
//! before evaluating it.
//!
//! ```text
//! echo : macro n (show n)
//! echo 5
//! ```
//!
//! expands `(show n)` to `(show 5)` and evaluates it.

use trellis_core::{Conformance, Environment, EvalResult, ProgramStack, Text, Trait, Value};

use super::function::Function;
use super::list::evaluate_operand;
use crate::keys;
use crate::macro_expand::MacroExpand;

#[derive(Clone, Debug)]
pub struct Macro {
    pub parameter: Value,
    pub body: Value,
}

impl Macro {
    pub fn new(parameter: Value, body: Value) -> Self {
        Macro { parameter, body }
    }

    pub fn into_trait(self) -> Trait<Macro> {
        Trait::constant(keys::macro_definition(), self)
    }

    /// Evaluate `argument`, expand the body with the result for the
    /// parameter, then evaluate the expanded body.
    pub fn apply(
        &self,
        argument: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> EvalResult {
        let replacement = evaluate_operand(argument, env, stack)?;
        let expanded = self
            .body
            .macro_expand(&self.parameter, &replacement, env, stack)?;
        evaluate_operand(&expanded, env, stack)
    }
}

/// `macro param body`: both arguments are taken as written.
pub(crate) fn macro_constructor() -> Value {
    Function::new(|parameter, _, _| {
        Ok(Function::new(move |body, _, _| {
            let location = parameter.location().cloned();
            Ok(Value::located(location).add(Macro::new(parameter.clone(), body).into_trait()))
        })
        .into_value(None))
    })
    .into_value(None)
}

pub(crate) fn register(env: &mut Environment) {
    // Macro ::= Function
    env.add_conformance(Conformance::new(
        keys::function(),
        keys::macro_definition().validation(),
        |definition: Macro, _, _| {
            Ok(Function::new(move |argument, env, stack| {
                definition.apply(&argument, env, stack)
            }))
        },
    ));

    // Macro ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::macro_definition().validation(),
        |_, _, _| Ok(Text::new("<macro>")),
    ));
}
