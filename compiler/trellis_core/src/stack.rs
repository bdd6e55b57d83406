//! Stack growth for deeply recursive derivation.
//!
//! Evaluating a block derives traits of its statements, which evaluate their
//! items, which may derive further traits. Nesting depth follows the user's
//! program, so every protocol call goes through [`ensure_sufficient_stack`].

/// Run `f`, growing the native stack first if the remaining space is low.
///
/// On WASM targets this calls `f` directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Remaining space below which the stack is grown (128KB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new stack segment (2MB).
    const GROWTH: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// WASM version: no stack switching available.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
