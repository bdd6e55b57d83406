//! The interpretation environment: conformance registry plus ambient state.
//!
//! One `Environment` lives for one interpretation pass and is threaded by
//! `&mut` through every derivation, evaluation and expansion, so a binding
//! made by one statement is visible to the next without any locking.

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::conformance::{AnyConformance, Conformance};
use crate::diagnostics::ProgramStack;
use crate::errors::EvalError;
use crate::trait_id::{RawTraitId, TraitId};
use crate::trait_instance::ErasedValue;
use crate::value::Value;

/// Registry of conformance rules indexed by derived key, plus typed slots for
/// whatever state collaborators need (bindings, output handlers, ...).
///
/// # Rule priority
///
/// Rules for a key are consulted in registration order and the first one
/// whose validation accepts the value wins. Two rules with overlapping
/// validations for the same key are not an error; the earlier one simply
/// shadows the later one for the values both accept.
pub struct Environment {
    conformances: FxHashMap<RawTraitId, Vec<AnyConformance>>,
    registered: usize,
    state: FxHashMap<TypeId, Box<dyn Any>>,
}

impl Environment {
    /// An environment with no rules and no state.
    pub fn new() -> Self {
        Environment {
            conformances: FxHashMap::default(),
            registered: 0,
            state: FxHashMap::default(),
        }
    }

    /// Register a rule. Later registrations have lower priority.
    pub fn add_conformance<A: 'static, B: Clone + 'static>(
        &mut self,
        conformance: Conformance<A, B>,
    ) {
        let rule = conformance.erase();
        tracing::trace!(trait_id = %rule.derived, "registering conformance");
        self.conformances.entry(rule.derived).or_default().push(rule);
        self.registered = self.registered.saturating_add(1);
    }

    /// Number of rules deriving `id`.
    pub fn conformance_count<T>(&self, id: TraitId<T>) -> usize {
        self.conformances.get(&id.raw()).map_or(0, Vec::len)
    }

    /// Number of rules registered for any key.
    pub fn total_conformances(&self) -> usize {
        self.registered
    }

    /// Derive `id` for `value` from the first rule that validates it.
    ///
    /// Returns `Ok(None)` when no rule for `id` accepts the value.
    pub(crate) fn derive(
        &mut self,
        value: &Value,
        id: RawTraitId,
        stack: &ProgramStack,
    ) -> Result<Option<ErasedValue>, EvalError> {
        // Rules run with `&mut self`, so iterate over a snapshot of the list.
        let Some(rules) = self.conformances.get(&id).cloned() else {
            tracing::trace!(trait_id = %id, "no conformances registered");
            return Ok(None);
        };

        for (index, rule) in rules.iter().enumerate() {
            if let Some(derived) = rule.apply(value, self, stack)? {
                tracing::trace!(trait_id = %id, rule = index, "conformance matched");
                return Ok(Some(derived));
            }
        }

        tracing::trace!(trait_id = %id, rules = rules.len(), "no conformance validated");
        Ok(None)
    }

    /// Mutable access to the state slot for `T`, created on first use.
    pub fn state_mut<T: Default + 'static>(&mut self) -> &mut T {
        self.state
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()) as Box<dyn Any>)
            .downcast_mut::<T>()
            .unwrap_or_else(|| unreachable!("state slots are keyed by their own TypeId"))
    }

    /// Shared access to the state slot for `T`, if it was ever created.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("conformances", &self.registered)
            .field("derived_traits", &self.conformances.len())
            .field("state_slots", &self.state.len())
            .finish()
    }
}
