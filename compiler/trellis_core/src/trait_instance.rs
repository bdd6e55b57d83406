//! Trait instances: a key bound to a lazily evaluated derivation.

use std::any::Any;
use std::rc::Rc;

use crate::diagnostics::ProgramStack;
use crate::environment::Environment;
use crate::errors::{trait_type_mismatch, EvalError};
use crate::trait_id::{RawTraitId, TraitId};
use crate::value::Value;

/// A realized trait value with its type erased.
pub(crate) type ErasedValue = Rc<dyn Any>;

type DeriveFn<T> = dyn Fn(&Value, &mut Environment, &ProgramStack) -> Result<T, EvalError>;

/// A named, lazily computed behavior bound to a key.
///
/// The derivation receives the value being queried and the current
/// environment. It does not run until the trait is first requested, and
/// runs at most once per value (see `Value::trait_of`).
pub struct Trait<T> {
    id: TraitId<T>,
    derive: Rc<DeriveFn<T>>,
}

impl<T> Clone for Trait<T> {
    fn clone(&self) -> Self {
        Trait {
            id: self.id,
            derive: Rc::clone(&self.derive),
        }
    }
}

impl<T: Clone + 'static> Trait<T> {
    /// Bind `id` to a derivation run on first request.
    pub fn new(
        id: TraitId<T>,
        derive: impl Fn(&Value, &mut Environment, &ProgramStack) -> Result<T, EvalError> + 'static,
    ) -> Self {
        Trait {
            id,
            derive: Rc::new(derive),
        }
    }

    /// Bind `id` to an already computed value.
    pub fn constant(id: TraitId<T>, value: T) -> Self {
        Self::new(id, move |_, _, _| Ok(value.clone()))
    }

    #[inline]
    pub fn id(&self) -> TraitId<T> {
        self.id
    }

    pub(crate) fn erase(self) -> AnyTrait {
        let derive = self.derive;
        AnyTrait {
            id: self.id.raw(),
            derive: Rc::new(move |value, env, stack| {
                let realized = derive(value, env, stack)?;
                Ok(Rc::new(realized) as ErasedValue)
            }),
        }
    }
}

/// Type-erased trait instance as stored on a `Value`.
#[derive(Clone)]
pub(crate) struct AnyTrait {
    pub(crate) id: RawTraitId,
    derive: Rc<DeriveFn<ErasedValue>>,
}

impl AnyTrait {
    pub(crate) fn realize(
        &self,
        value: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<ErasedValue, EvalError> {
        (self.derive)(value, env, stack)
    }
}

/// Extract a `T` from an erased instance realized under `id`.
pub(crate) fn downcast<T: Clone + 'static>(
    erased: &ErasedValue,
    id: RawTraitId,
) -> Result<T, EvalError> {
    erased
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| trait_type_mismatch(id.label()))
}
