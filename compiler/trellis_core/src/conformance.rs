//! Conformance rules: "a value that validates against P can derive trait T
//! by applying F to P's qualifying source".
//!
//! Validations are ordinary trait probes, so they go through the same
//! dispatch they extend: "conforms to Block" is `block_id.validation()`,
//! which accepts any value holding or deriving a Block instance.

use std::rc::Rc;

use crate::diagnostics::ProgramStack;
use crate::environment::Environment;
use crate::errors::EvalError;
use crate::trait_id::{RawTraitId, TraitId};
use crate::trait_instance::ErasedValue;
use crate::value::Value;

type ValidateFn<A> =
    dyn Fn(&Value, &mut Environment, &ProgramStack) -> Result<Option<A>, EvalError>;

type DeriveFn<A, B> = dyn Fn(A, &mut Environment, &ProgramStack) -> Result<B, EvalError>;

/// Predicate over a candidate value.
///
/// Yields the qualifying source (`Some`) when the value is accepted and
/// `None` when it is not.
pub struct Validation<A> {
    check: Rc<ValidateFn<A>>,
}

impl<A> Clone for Validation<A> {
    fn clone(&self) -> Self {
        Validation {
            check: Rc::clone(&self.check),
        }
    }
}

impl<A: 'static> Validation<A> {
    pub fn new(
        check: impl Fn(&Value, &mut Environment, &ProgramStack) -> Result<Option<A>, EvalError>
            + 'static,
    ) -> Self {
        Validation {
            check: Rc::new(check),
        }
    }

    pub fn validate(
        &self,
        value: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<Option<A>, EvalError> {
        (self.check)(value, env, stack)
    }

    /// Transform the qualifying source of an accepted value.
    #[must_use]
    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + 'static) -> Validation<B> {
        Validation::new(move |value, env, stack| Ok(self.validate(value, env, stack)?.map(&f)))
    }

    /// Accept what `self` accepts, falling back to `other`.
    #[must_use]
    pub fn or(self, other: Validation<A>) -> Validation<A> {
        Validation::new(move |value, env, stack| match self.validate(value, env, stack)? {
            Some(source) => Ok(Some(source)),
            None => other.validate(value, env, stack),
        })
    }
}

impl<T: Clone + 'static> TraitId<T> {
    /// Accept values that hold or can derive this trait; the qualifying
    /// source is the trait's value.
    pub fn validation(self) -> Validation<T> {
        Validation::new(move |value, env, stack| value.trait_if_present(self, env, stack))
    }
}

/// A registered rule deriving `B` from sources of type `A`.
pub struct Conformance<A, B> {
    derived: TraitId<B>,
    validation: Validation<A>,
    derive: Rc<DeriveFn<A, B>>,
}

impl<A: 'static, B: Clone + 'static> Conformance<A, B> {
    pub fn new(
        derived: TraitId<B>,
        validation: Validation<A>,
        derive: impl Fn(A, &mut Environment, &ProgramStack) -> Result<B, EvalError> + 'static,
    ) -> Self {
        Conformance {
            derived,
            validation,
            derive: Rc::new(derive),
        }
    }

    #[inline]
    pub fn derived_trait_id(&self) -> TraitId<B> {
        self.derived
    }

    pub(crate) fn erase(self) -> AnyConformance {
        let Conformance {
            derived,
            validation,
            derive,
        } = self;
        AnyConformance {
            derived: derived.raw(),
            apply: Rc::new(move |value, env, stack| {
                let Some(source) = validation.validate(value, env, stack)? else {
                    return Ok(None);
                };
                let derived = derive(source, env, stack)?;
                Ok(Some(Rc::new(derived) as ErasedValue))
            }),
        }
    }
}

type ApplyFn =
    dyn Fn(&Value, &mut Environment, &ProgramStack) -> Result<Option<ErasedValue>, EvalError>;

/// Type-erased rule as stored in the registry.
#[derive(Clone)]
pub(crate) struct AnyConformance {
    pub(crate) derived: RawTraitId,
    apply: Rc<ApplyFn>,
}

impl AnyConformance {
    /// Validate `value` and, if accepted, derive the trait.
    pub(crate) fn apply(
        &self,
        value: &Value,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<Option<ErasedValue>, EvalError> {
        (self.apply)(value, env, stack)
    }
}
