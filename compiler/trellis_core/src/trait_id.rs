//! Identity-compared trait keys.
//!
//! A key is a process-unique index plus a label. The index is handed out by
//! a global counter when the key is declared, so two keys declared with the
//! same label are still different keys. The label exists only for
//! diagnostics.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INDEX: AtomicU64 = AtomicU64::new(0);

/// Type-erased trait key, used wherever the extracted type is not known
/// statically (registry indexing, memo tables, diagnostics).
#[derive(Clone, Copy)]
pub struct RawTraitId {
    index: u64,
    label: &'static str,
}

impl RawTraitId {
    /// Debug label given at declaration.
    #[inline]
    pub fn label(self) -> &'static str {
        self.label
    }

    /// Declaration index. Unique for the life of the process.
    #[inline]
    pub fn index(self) -> u64 {
        self.index
    }
}

impl PartialEq for RawTraitId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for RawTraitId {}

impl Hash for RawTraitId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for RawTraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.index)
    }
}

impl fmt::Display for RawTraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Key naming a derivable behavior that extracts a `T`.
///
/// `PhantomData<fn() -> T>` keeps the key `Send + Sync` and covariant
/// regardless of `T`, so built-in keys can live in statics.
pub struct TraitId<T> {
    raw: RawTraitId,
    marker: PhantomData<fn() -> T>,
}

impl<T> TraitId<T> {
    /// Declare a new key. Every call yields a distinct identity.
    pub fn declare(label: &'static str) -> Self {
        let index = NEXT_INDEX.fetch_add(1, Ordering::Relaxed);
        TraitId {
            raw: RawTraitId { index, label },
            marker: PhantomData,
        }
    }

    /// The type-erased key.
    #[inline]
    pub fn raw(self) -> RawTraitId {
        self.raw
    }

    /// Debug label given at declaration.
    #[inline]
    pub fn label(self) -> &'static str {
        self.raw.label
    }
}

impl<T> Clone for TraitId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TraitId<T> {}

impl<T> PartialEq for TraitId<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for TraitId<T> {}

impl<T> Hash for TraitId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for TraitId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraitId({:?})", self.raw)
    }
}

/// Declare a built-in trait key as a function returning the same identity on
/// every call.
///
/// ```text
/// trait_key! {
///     /// Textual rendering of a value.
///     pub fn text -> Text = "Text"
/// }
/// ```
#[macro_export]
macro_rules! trait_key {
    ($(#[$meta:meta])* $vis:vis fn $name:ident -> $ty:ty = $label:literal) => {
        $(#[$meta])*
        $vis fn $name() -> $crate::TraitId<$ty> {
            static ID: ::std::sync::LazyLock<$crate::TraitId<$ty>> =
                ::std::sync::LazyLock::new(|| $crate::TraitId::declare($label));
            *ID
        }
    };
}
