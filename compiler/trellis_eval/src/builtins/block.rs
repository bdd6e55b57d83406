//! Blocks: ordered statements evaluated for their last result.

use trellis_core::{
    Conformance, Environment, EvalError, EvalResult, ProgramStack, SourceLocation, Text, Trait,
    Value,
};

use super::list::List;
use super::located;
use crate::evaluate::{Evaluate, EvaluateFn};
use crate::keys;
use crate::macro_expand::{MacroExpand, MacroExpandFn};

/// One form: the values written on a line, in order.
pub type Statement = Vec<Value>;

#[derive(Clone, Debug, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }

    pub fn into_trait(self) -> Trait<Block> {
        Trait::constant(keys::block(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }

    /// Run each statement in order; the block's value is the last result.
    ///
    /// Stops at the first failing statement. An empty block yields the empty
    /// value.
    pub fn evaluate(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        let mut result = Value::empty();
        for statement in &self.statements {
            result = statement_as_list(statement).evaluate(env, stack)?;
        }
        Ok(result)
    }

    /// Expand every statement, rebuilding a block of the same shape.
    pub fn macro_expand(
        &self,
        parameter: &Value,
        replacement: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<Block, EvalError> {
        let statements = self
            .statements
            .iter()
            .map(|statement| -> Result<Statement, EvalError> {
                let expanded = statement_as_list(statement)
                    .macro_expand(parameter, replacement, env, stack)?;
                Ok(expanded.trait_of(keys::list(), env, stack)?.items)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        Ok(Block::new(statements))
    }
}

/// Wrap a statement as a list value located at its first item.
pub(crate) fn statement_as_list(statement: &[Value]) -> Value {
    let location = statement.first().and_then(|item| item.location().cloned());
    List::new(statement.to_vec()).into_value(location)
}

pub(crate) fn register(env: &mut Environment) {
    // Block ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        keys::block().validation(),
        |_, _, _| Ok(Text::new("<block>")),
    ));

    // Block ::= Evaluate
    env.add_conformance(Conformance::new(
        keys::evaluate(),
        keys::block().validation(),
        |block: Block, _, _| {
            Ok(EvaluateFn::new(move |env, stack| block.evaluate(env, stack)))
        },
    ));

    // Block ::= Macro-Expand
    env.add_conformance(Conformance::new(
        keys::macro_expand(),
        located(keys::block()),
        |(block, location): (Block, Option<SourceLocation>), _, _| {
            Ok(MacroExpandFn::new(move |parameter, replacement, env, stack| {
                let expanded = block.macro_expand(parameter, replacement, env, stack)?;
                Ok(expanded.into_value(location.clone()))
            }))
        },
    ));
}
