//! Trellis Core - trait-conformance dispatch for the Trellis interpreter.
//!
//! Runtime values in Trellis have no fixed type hierarchy. A [`Value`] is a
//! persistent list of realized trait instances; everything else it can do is
//! derived on request from conformance rules registered in the
//! [`Environment`].
//!
//! # Architecture
//!
//! - [`TraitId`]: identity-compared key carrying the type it extracts
//! - [`Trait`]: a key bound to a lazily evaluated derivation
//! - [`Value`]: immutable-update container of trait instances
//! - [`Environment`]: ordered conformance rules plus ambient interpretation state
//! - [`ProgramStack`]: copy-on-recurse diagnostic call chain
//!
//! Resolution of `value.trait_of(id, ..)` checks the value's own instances
//! first, then the rules registered for exactly `id`, in registration order.
//! The first rule whose validation accepts the value wins, and the result is
//! memoized on the value.

mod conformance;
mod diagnostics;
mod environment;
mod errors;
mod location;
mod stack;
mod text;
mod trait_id;
mod trait_instance;
mod value;

pub use conformance::{Conformance, Validation};
pub use diagnostics::{ProgramStack, StackFrame};
pub use environment::Environment;
pub use errors::{
    cyclic_derivation, missing_conformance, recursion_limit_exceeded, trait_type_mismatch,
    undefined_variable, BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult,
};
pub use location::SourceLocation;
pub use stack::ensure_sufficient_stack;
pub use text::{Text, PLACEHOLDER};
pub use trait_id::{RawTraitId, TraitId};
pub use trait_instance::Trait;
pub use value::Value;

/// Built-in trait keys owned by the core.
pub mod keys {
    use crate::Text;

    crate::trait_key! {
        /// Textual rendering of a value.
        pub fn text -> Text = "Text"
    }
}
