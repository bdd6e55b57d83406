//! Error types for trait resolution and evaluation.
//!
//! `EvalErrorKind` carries the structured category; `EvalError` pairs it with
//! a snapshot of the diagnostic stack taken where the error was raised.
//! Factory functions (e.g. `missing_conformance()`) are the public
//! construction API.

use std::fmt;

use crate::location::SourceLocation;
use crate::value::Value;

/// Result of evaluating or expanding a value.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    /// No realized instance and no conformance rule validated.
    #[error("value does not conform to {label}")]
    MissingConformance { label: &'static str },

    /// A trait was requested again while it was still being derived for the
    /// same value.
    #[error("cyclic derivation of {label}")]
    CyclicDerivation { label: &'static str },

    /// Nesting exceeded the configured depth limit.
    #[error("maximum derivation depth exceeded (limit: {depth})")]
    RecursionLimit { depth: usize },

    /// A stored instance could not be extracted as the key's type.
    #[error("trait {label} holds a value of an unexpected type")]
    TraitTypeMismatch { label: &'static str },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// Catch-all raised by collaborators through `EvalError::new`.
    #[error("{message}")]
    Custom { message: String },
}

/// One recorded frame of a backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub label: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for BacktraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({location})", self.label),
            None => f.write_str(&self.label),
        }
    }
}

/// Immutable snapshot of a `ProgramStack`, most recent frame first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        EvalBacktrace { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "\n    {frame}")?;
        }
        Ok(())
    }
}

/// Error raised while resolving traits, evaluating, or expanding.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}{trace}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub trace: EvalBacktrace,
}

impl EvalError {
    /// Create an error with a free-form message.
    ///
    /// Prefer a factory function when a structured kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            trace: EvalBacktrace::default(),
        }
    }

    /// Attach a backtrace, replacing any previous one.
    #[must_use]
    pub fn with_backtrace(mut self, trace: EvalBacktrace) -> Self {
        self.trace = trace;
        self
    }

    /// The error message without the backtrace.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cold]
pub fn missing_conformance(label: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingConformance { label })
}

#[cold]
pub fn cyclic_derivation(label: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CyclicDerivation { label })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { depth })
}

#[cold]
pub fn trait_type_mismatch(label: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TraitTypeMismatch { label })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests;
