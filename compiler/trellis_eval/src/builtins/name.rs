//! Names: variable references.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use trellis_core::{
    undefined_variable, Conformance, Environment, EvalError, EvalResult, ProgramStack,
    SourceLocation, Text, Trait, Value,
};

use super::located;
use crate::evaluate::EvaluateFn;
use crate::keys;
use crate::macro_expand::MacroExpandFn;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Name { name: name.into() }
    }

    pub fn into_trait(self) -> Trait<Name> {
        Trait::constant(keys::name(), self)
    }

    pub fn into_value(self, location: Option<SourceLocation>) -> Value {
        Value::located(location).add(self.into_trait())
    }

    /// Look the name up in the environment's bindings.
    pub fn resolve(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        let stack = stack.push(|| format!("resolving variable '{}'", self.name))?;
        env.state::<Bindings>()
            .and_then(|bindings| bindings.get(&self.name))
            .cloned()
            .ok_or_else(|| undefined_variable(&self.name).with_backtrace(stack.backtrace()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Variables defined during one interpretation pass.
///
/// Lives in the environment's state, so a binding made by one statement is
/// visible to every statement after it.
#[derive(Debug, Default)]
pub struct Bindings {
    values: FxHashMap<String, Value>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Define or redefine `name`.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type AssignClosure = dyn Fn(Value, &mut Environment, &ProgramStack) -> Result<(), EvalError>;

/// Value of the `Assign` trait: store an evaluated value into the target.
#[derive(Clone)]
pub struct AssignFn(Rc<AssignClosure>);

impl AssignFn {
    pub fn new(
        assign: impl Fn(Value, &mut Environment, &ProgramStack) -> Result<(), EvalError> + 'static,
    ) -> Self {
        AssignFn(Rc::new(assign))
    }

    pub fn call(
        &self,
        value: Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<(), EvalError> {
        (self.0)(value, env, stack)
    }
}

impl fmt::Debug for AssignFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AssignFn")
    }
}

pub(crate) fn register(env: &mut Environment) {
    // Name ::= Evaluate
    env.add_conformance(Conformance::new(
        keys::evaluate(),
        keys::name().validation(),
        |name: Name, _, _| Ok(EvaluateFn::new(move |env, stack| name.resolve(env, stack))),
    ));

    // Name ::= Assign
    env.add_conformance(Conformance::new(
        keys::assign(),
        keys::name().validation(),
        |name: Name, _, _| {
            Ok(AssignFn::new(move |value, env, _| {
                tracing::trace!(name = %name, "defining variable");
                env.state_mut::<Bindings>().define(name.name.clone(), value);
                Ok(())
            }))
        },
    ));

    // Name ::= Macro-Expand
    env.add_conformance(Conformance::new(
        keys::macro_expand(),
        located(keys::name()),
        |(name, location): (Name, Option<SourceLocation>), _, _| {
            Ok(MacroExpandFn::new(move |parameter, replacement, env, stack| {
                let parameter = parameter.trait_if_present(keys::name(), env, stack)?;
                if parameter.as_ref() == Some(&name) {
                    Ok(replacement.clone())
                } else {
                    Ok(name.clone().into_value(location.clone()))
                }
            }))
        },
    ));

    // Name ::= Text
    env.add_conformance(Conformance::new(
        keys::text(),
        located(keys::name()),
        |(name, location): (Name, Option<SourceLocation>), _, _| {
            Ok(Text::new(name.name).at(location))
        },
    ));
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
