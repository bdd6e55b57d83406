//! Trellis Eval - evaluation and macro expansion on top of trait dispatch.
//!
//! Neither protocol is special to the core. Each is an ordinary trait key
//! ([`keys::evaluate`], [`keys::macro_expand`]) whose value is a function,
//! and each built-in value kind gains it through conformance rules
//! registered by [`InterpreterBuilder::build`].
//!
//! # Value kinds
//!
//! - [`Block`]: statements run in order; the last result is the block's value
//! - [`List`]: one statement, evaluated as assignment or function application
//! - [`Name`]: a variable reference, assignable and substitutable
//! - [`Number`], [`Quoted`], [`Function`], [`Macro`]: leaves and callables

mod builtins;
mod evaluate;
mod interpreter;
mod macro_expand;
mod output;
mod tracing_setup;

pub use builtins::block::{Block, Statement};
pub use builtins::function::{Call, Function};
pub use builtins::list::List;
pub use builtins::macros::Macro;
pub use builtins::name::{AssignFn, Bindings, Name};
pub use builtins::number::Number;
pub use builtins::quoted::Quoted;
pub use evaluate::{Evaluate, EvaluateFn};
pub use interpreter::{EvalConfig, Interpreter, InterpreterBuilder, DEFAULT_MAX_DEPTH};
pub use macro_expand::{MacroExpand, MacroExpandFn};
pub use output::Output;
pub use tracing_setup::init_tracing;

/// Trait keys for the evaluation layer.
pub mod keys {
    use crate::{
        AssignFn, Block, EvaluateFn, Function, List, Macro, MacroExpandFn, Name, Number, Quoted,
    };

    pub use trellis_core::keys::text;

    trellis_core::trait_key! {
        /// Function of the environment producing the value's result.
        pub fn evaluate -> EvaluateFn = "Evaluate"
    }

    trellis_core::trait_key! {
        /// Substitution of a parameter throughout the value's structure.
        pub fn macro_expand -> MacroExpandFn = "Macro-Expand"
    }

    trellis_core::trait_key! {
        pub fn block -> Block = "Block"
    }

    trellis_core::trait_key! {
        pub fn list -> List = "List"
    }

    trellis_core::trait_key! {
        pub fn name -> Name = "Name"
    }

    trellis_core::trait_key! {
        /// Target of `left : right`.
        pub fn assign -> AssignFn = "Assign"
    }

    trellis_core::trait_key! {
        pub fn number -> Number = "Number"
    }

    trellis_core::trait_key! {
        pub fn quoted -> Quoted = "Quoted"
    }

    trellis_core::trait_key! {
        pub fn function -> Function = "Function"
    }

    trellis_core::trait_key! {
        pub fn macro_definition -> Macro = "Macro"
    }
}
