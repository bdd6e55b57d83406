//! Lists: a single form, evaluated as assignment or function application.
//!
//! ```text
//! (x : 1)        assign the value of `1` through the Assign trait of `x`
//! (show x)       evaluate `show`, then call it with `x`
//! (f a b)        ((f a) b)
//! ()             the empty value
//! ```

use trellis_core::{
    Conformance, Environment, EvalError, EvalResult, ProgramStack, SourceLocation, Text, Trait,
    Value,
};

use super::function::Call;
use super::located;
use crate::evaluate::{Evaluate, EvaluateFn};
use crate::keys;
use crate::macro_expand::{MacroExpand, MacroExpandFn};

/// Name that separates the target of an assignment from its value.
pub const ASSIGNMENT_OPERATOR: &str = ":";

#[derive(Clone, Debug, Default)]
pub struct List {
    pub items: Vec<Value>,
}

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        List { items }
    }

    pub fn into_trait(self) -> Trait<List> {
        Trait::constant(keys::list(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }

    pub fn evaluate(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        if let Some(index) = self.assignment_operator(env, stack)? {
            let (left, right) = (&self.items[..index], &self.items[index + 1..]);
            return assign(left, right, env, stack);
        }

        let Some((head, arguments)) = self.items.split_first() else {
            return Ok(Value::empty());
        };

        let mut result = evaluate_operand(head, env, stack)?;
        for argument in arguments {
            result = result.call(argument.clone(), env, stack)?;
        }
        Ok(result)
    }

    /// Expand items that support expansion; keep the rest as they are.
    pub fn macro_expand(
        &self,
        parameter: &Value,
        replacement: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<List, EvalError> {
        let mut items = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let expanded = if item.has_trait(keys::macro_expand(), env, stack)? {
                item.macro_expand(parameter, replacement, env, stack)?
            } else {
                item.clone()
            };
            items.push(expanded);
        }
        Ok(List::new(items))
    }

    /// Render as `(a b c)`.
    pub fn render(&self, env: &mut Environment, stack: &ProgramStack) -> String {
        let items: Vec<_> = self.items.iter().map(|item| item.format(env, stack)).collect();
        format!("({})", items.join(" "))
    }

    fn assignment_operator(
        &self,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<Option<usize>, EvalError> {
        for (index, item) in self.items.iter().enumerate() {
            if let Some(name) = item.trait_if_present(keys::name(), env, stack)? {
                if name.name == ASSIGNMENT_OPERATOR {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }
}

/// Values without an `Evaluate` trait stand for themselves.
pub(crate) fn evaluate_operand(
    item: &Value,
    env: &mut Environment,
    stack: &ProgramStack,
) -> EvalResult {
    if item.has_trait(keys::evaluate(), env, stack)? {
        item.evaluate(env, stack)
    } else {
        Ok(item.clone())
    }
}

/// A run of items as one value: the item itself, or a list of them.
fn group(items: &[Value]) -> Value {
    match items {
        [single] => single.clone(),
        _ => {
            let location = items.first().and_then(|item| item.location().cloned());
            List::new(items.to_vec()).into_value(location)
        }
    }
}

fn assign(
    left: &[Value],
    right: &[Value],
    env: &mut Environment,
    stack: &ProgramStack,
) -> EvalResult {
    if left.is_empty() || right.is_empty() {
        return Err(
            EvalError::new("assignment needs a target on the left and a value on the right")
                .with_backtrace(stack.backtrace()),
        );
    }

    let target = group(left);
    let value = evaluate_operand(&group(right), env, stack)?;
    let assign = target.trait_of(keys::assign(), env, stack)?;
    assign.call(value, env, stack)?;
    Ok(Value::empty())
}

pub(crate) fn register(env: &mut Environment) {
    // List ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::list().validation(),
        |list: List, env, stack| Ok(Text::new(list.render(env, stack))),
    ));

    // List ::= Evaluate
    env.add_conformance(Conformance::new(
        keys::evaluate(),
        keys::list().validation(),
        |list: List, _, _| Ok(EvaluateFn::new(move |env, stack| list.evaluate(env, stack))),
    ));

    // List ::= Macro-Expand
    env.add_conformance(Conformance::new(
        keys::macro_expand(),
        located(keys::list()),
        |(list, location): (List, Option<SourceLocation>), _, _| {
            Ok(MacroExpandFn::new(move |parameter, replacement, env, stack| {
                let expanded = list.macro_expand(parameter, replacement, env, stack)?;
                Ok(expanded.into_value(location.clone()))
            }))
        },
    ));
}
