//! Built-in value kinds and their conformances.
//!
//! Registration order is rule priority, so it is fixed here in one place.

pub mod block;
pub mod function;
pub mod list;
pub mod macros;
pub mod name;
pub mod number;
pub mod quoted;

use trellis_core::{Environment, SourceLocation, TraitId, Validation, Value};

/// Register every built-in conformance.
pub(crate) fn register_conformances(env: &mut Environment) {
    block::register(env);
    list::register(env);
    name::register(env);
    number::register(env);
    quoted::register(env);
    // Macros also derive Function; their own Text must come first.
    macros::register(env);
    function::register(env);
    tracing::debug!(
        conformances = env.total_conformances(),
        "registered built-in conformances"
    );
}

/// Define the built-in bindings (`show`, `macro`).
pub(crate) fn define_bindings(env: &mut Environment) {
    let bindings = env.state_mut::<name::Bindings>();
    bindings.define("show", function::show());
    bindings.define("macro", macros::macro_constructor());
}

/// Accept holders of `id`, keeping the value's location alongside.
///
/// Rules that rebuild a value use the location so the result still points
/// at the source it came from.
pub(crate) fn located<T: Clone + 'static>(
    id: TraitId<T>,
) -> Validation<(T, Option<SourceLocation>)> {
    Validation::new(move |value: &Value, env, stack| {
        let found = value.trait_if_present(id, env, stack)?;
        Ok(found.map(|source| (source, value.location().cloned())))
    })
}
