//! Runtime values as persistent lists of trait instances.
//!
//! A `Value` never changes after construction. `add` builds a new value whose
//! instance list points at the receiver's list, so values share structure and
//! can be handed to any number of call sites without copying.
//!
//! # Memoization
//!
//! Each value owns a memo table shared by all of its clones. The first time a
//! key is realized for a value, whether from one of its own instances or from
//! a registry rule, the result is stored there and every later request for
//! that key on that value (or any clone of it) is answered from the table.
//! Values produced by `add` start with an empty table.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::diagnostics::ProgramStack;
use crate::environment::Environment;
use crate::errors::{missing_conformance, EvalError};
use crate::location::SourceLocation;
use crate::stack::ensure_sufficient_stack;
use crate::trait_id::{RawTraitId, TraitId};
use crate::trait_instance::{downcast, AnyTrait, ErasedValue, Trait};

/// Immutable-update container of trait instances plus an optional source
/// location. The empty value (no instances) represents "no value".
#[derive(Clone)]
pub struct Value {
    inner: Rc<ValueInner>,
}

struct ValueInner {
    /// Newest instance first.
    traits: Option<Rc<TraitNode>>,
    location: Option<SourceLocation>,
    memo: RefCell<FxHashMap<RawTraitId, ErasedValue>>,
}

struct TraitNode {
    instance: AnyTrait,
    prev: Option<Rc<TraitNode>>,
}

impl Value {
    /// The value with no trait instances.
    pub fn empty() -> Self {
        Self::located(None)
    }

    /// An empty value carrying a source location.
    pub fn located(location: Option<SourceLocation>) -> Self {
        Self::from_parts(None, location)
    }

    /// An empty value extended with one instance.
    pub fn of<T: Clone + 'static>(instance: Trait<T>) -> Self {
        Self::empty().add(instance)
    }

    fn from_parts(traits: Option<Rc<TraitNode>>, location: Option<SourceLocation>) -> Self {
        Value {
            inner: Rc::new(ValueInner {
                traits,
                location,
                memo: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// A new value holding every instance of `self` plus `instance`.
    ///
    /// If `self` already holds an instance for the same key, the new one
    /// shadows it.
    #[must_use]
    pub fn add<T: Clone + 'static>(&self, instance: Trait<T>) -> Value {
        let node = TraitNode {
            instance: instance.erase(),
            prev: self.inner.traits.clone(),
        };
        Self::from_parts(Some(Rc::new(node)), self.inner.location.clone())
    }

    /// The same instances under a different source location.
    #[must_use]
    pub fn with_location(&self, location: Option<SourceLocation>) -> Value {
        Self::from_parts(self.inner.traits.clone(), location)
    }

    #[inline]
    pub fn location(&self) -> Option<&SourceLocation> {
        self.inner.location.as_ref()
    }

    /// Whether the value has no realized instances.
    pub fn is_empty(&self) -> bool {
        self.inner.traits.is_none()
    }

    /// Keys of the value's own instances, in the order they were added.
    pub fn realized_traits(&self) -> Vec<RawTraitId> {
        let mut ids: Vec<_> = self.nodes().map(|node| node.instance.id).collect();
        ids.reverse();
        ids
    }

    /// Whether both handles refer to the same value.
    #[inline]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether `id` has already been realized and cached on this value.
    pub fn is_memoized(&self, id: RawTraitId) -> bool {
        self.inner.memo.borrow().contains_key(&id)
    }

    /// Resolve `id`, failing with `MissingConformance` if the value neither
    /// holds an instance nor validates against any rule for it.
    pub fn trait_of<T: Clone + 'static>(
        &self,
        id: TraitId<T>,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<T, EvalError> {
        self.trait_if_present(id, env, stack)?.ok_or_else(|| {
            missing_conformance(id.label()).with_backtrace(stack.backtrace())
        })
    }

    /// Resolve `id`, yielding `None` if it cannot be realized.
    ///
    /// Errors raised while deriving (a failing derivation, a cycle, the depth
    /// limit) still propagate; only absence is turned into `None`.
    pub fn trait_if_present<T: Clone + 'static>(
        &self,
        id: TraitId<T>,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<Option<T>, EvalError> {
        let raw = id.raw();
        if let Some(cached) = self.memoized(raw) {
            tracing::trace!(trait_id = %raw, "memo hit");
            return downcast(&cached, raw).map(Some);
        }

        // Derivations recurse into nested values (rendering a list renders
        // its items), so depth follows the program.
        ensure_sufficient_stack(|| {
            let stack = stack.enter_derivation(self.identity(), raw)?;
            let realized = match self.find_realized(raw) {
                Some(instance) => instance.realize(self, env, &stack)?,
                None => match env.derive(self, raw, &stack)? {
                    Some(derived) => derived,
                    None => return Ok(None),
                },
            };

            self.inner
                .memo
                .borrow_mut()
                .insert(raw, Rc::clone(&realized));
            downcast(&realized, raw).map(Some)
        })
    }

    /// Whether `id` can be resolved for this value.
    pub fn has_trait<T: Clone + 'static>(
        &self,
        id: TraitId<T>,
        env: &mut Environment,
        stack: &ProgramStack,
    ) -> Result<bool, EvalError> {
        Ok(self.trait_if_present(id, env, stack)?.is_some())
    }

    fn memoized(&self, id: RawTraitId) -> Option<ErasedValue> {
        self.inner.memo.borrow().get(&id).cloned()
    }

    fn find_realized(&self, id: RawTraitId) -> Option<AnyTrait> {
        self.nodes()
            .find(|node| node.instance.id == id)
            .map(|node| node.instance.clone())
    }

    fn nodes(&self) -> impl Iterator<Item = &TraitNode> {
        std::iter::successors(self.inner.traits.as_deref(), |node| node.prev.as_deref())
    }

    /// Identity used for cycle detection; stable for the life of the value.
    fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<_> = self
            .realized_traits()
            .into_iter()
            .map(RawTraitId::label)
            .collect();
        f.debug_struct("Value")
            .field("traits", &labels)
            .field("location", &self.inner.location)
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
