//! The macro-expansion protocol.
//!
//! Expansion is a structural walk: composite values expand their children
//! and rebuild themselves, leaves decide on their own whether they match the
//! parameter. Nothing here knows which kinds are composite.

use std::fmt;
use std::rc::Rc;

use trellis_core::{ensure_sufficient_stack, Environment, EvalResult, ProgramStack, Trait, Value};

use crate::keys;

type MacroExpandClosure = dyn Fn(&Value, &Value, &mut Environment, &ProgramStack) -> EvalResult;

/// Value of the `Macro-Expand` trait: `(parameter, replacement)` to the
/// expanded value.
#[derive(Clone)]
pub struct MacroExpandFn(Rc<MacroExpandClosure>);

impl MacroExpandFn {
    pub fn new(
        expand: impl Fn(&Value, &Value, &mut Environment, &ProgramStack) -> EvalResult + 'static,
    ) -> Self {
        MacroExpandFn(Rc::new(expand))
    }

    pub fn call(
        &self,
        parameter: &Value,
        replacement: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> EvalResult {
        (self.0)(parameter, replacement, env, stack)
    }

    pub fn into_trait(self) -> Trait<MacroExpandFn> {
        Trait::constant(keys::macro_expand(), self)
    }
}

impl fmt::Debug for MacroExpandFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MacroExpandFn")
    }
}

/// Substitute `replacement` for every occurrence of `parameter`.
pub trait MacroExpand {
    fn macro_expand(
        &self,
        parameter: &Value,
        replacement: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> EvalResult;
}

impl MacroExpand for Value {
    /// Fails with `MissingConformance` if the value has no `Macro-Expand`
    /// trait.
    fn macro_expand(
        &self,
        parameter: &Value,
        replacement: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> EvalResult {
        ensure_sufficient_stack(|| {
            let stack = stack.push_located(
                || format!("expanding {}", self.format(env, stack)),
                self.location(),
            )?;
            let expand = self.trait_of(keys::macro_expand(), env, &stack)?;
            expand.call(parameter, replacement, env, &stack)
        })
    }
}
