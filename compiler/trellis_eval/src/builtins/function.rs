//! Callable values and the built-in `show` function.

use std::fmt;
use std::rc::Rc;

use trellis_core::{
    ensure_sufficient_stack, Conformance, Environment, EvalError, EvalResult, ProgramStack,
    SourceLocation, Text, Trait, Value,
};

use super::list::evaluate_operand;
use crate::keys;
use crate::output::Output;

type FunctionClosure = dyn Fn(Value, &mut Environment, &ProgramStack) -> EvalResult;

/// Value of the `Function` trait.
///
/// Receives its argument unevaluated; functions that want the argument's
/// value evaluate it themselves.
#[derive(Clone)]
pub struct Function(Rc<FunctionClosure>);

impl Function {
    pub fn new(
        function: impl Fn(Value, &mut Environment, &ProgramStack) -> EvalResult + 'static,
    ) -> Self {
        Function(Rc::new(function))
    }

    pub fn call(&self, argument: Value, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        (self.0)(argument, env, stack)
    }

    pub fn into_trait(self) -> Trait<Function> {
        Trait::constant(keys::function(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

/// Apply a value to an argument through its `Function` trait.
pub trait Call {
    fn call(&self, argument: Value, env: &mut Environment, stack: &ProgramStack) -> EvalResult;
}

impl Call for Value {
    fn call(&self, argument: Value, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        let stack = stack.push_located(
            || format!("calling {}", self.format(env, stack)),
            self.location(),
        )?;
        let Some(function) = self.trait_if_present(keys::function(), env, &stack)? else {
            let rendered = self.format(env, &stack);
            return Err(EvalError::new(format!(
                "cannot call {rendered} because it is not a function"
            ))
            .with_backtrace(stack.backtrace()));
        };
        ensure_sufficient_stack(|| function.call(argument, env, &stack))
    }
}

/// `show x`: evaluate `x` and write its rendering to the output handler.
pub(crate) fn show() -> Value {
    Function::new(|argument, env, stack| {
        let value = evaluate_operand(&argument, env, stack)?;
        let rendered = value.format(env, stack);
        env.state_mut::<Output>().println(&rendered);
        Ok(Value::empty())
    })
    .into_value(None)
}

pub(crate) fn register(env: &mut Environment) {
    // Function ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::function().validation(),
        |_, _, _| Ok(Text::new("<function>")),
    ));
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
