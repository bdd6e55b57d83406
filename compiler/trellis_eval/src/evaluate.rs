//! The evaluation protocol.

use std::fmt;
use std::rc::Rc;

use trellis_core::{ensure_sufficient_stack, Environment, EvalResult, ProgramStack, Trait, Value};

use crate::keys;

type EvaluateClosure = dyn Fn(&mut Environment, &ProgramStack) -> EvalResult;

/// Value of the `Evaluate` trait: run the value in an environment.
#[derive(Clone)]
pub struct EvaluateFn(Rc<EvaluateClosure>);

impl EvaluateFn {
    pub fn new(evaluate: impl Fn(&mut Environment, &ProgramStack) -> EvalResult + 'static) -> Self {
        EvaluateFn(Rc::new(evaluate))
    }

    pub fn call(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        (self.0)(env, stack)
    }

    /// A constant `Evaluate` instance.
    pub fn into_trait(self) -> Trait<EvaluateFn> {
        Trait::constant(keys::evaluate(), self)
    }
}

impl fmt::Debug for EvaluateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EvaluateFn")
    }
}

/// Evaluate a value through its `Evaluate` trait.
pub trait Evaluate {
    fn evaluate(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult;
}

impl Evaluate for Value {
    /// Fails with `MissingConformance` if the value has no `Evaluate` trait.
    fn evaluate(&self, env: &mut Environment, stack: &ProgramStack) -> EvalResult {
        ensure_sufficient_stack(|| {
            let stack = stack.push_located(
                || format!("evaluating {}", self.format(env, stack)),
                self.location(),
            )?;
            let evaluate = self.trait_of(keys::evaluate(), env, &stack)?;
            evaluate.call(env, &stack)
        })
    }
}
