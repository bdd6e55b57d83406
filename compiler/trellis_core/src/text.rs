//! Textual rendering of values.
//!
//! `Text` is an ordinary trait: built-in kinds register a rule or carry an
//! instance for it like any other behavior. `Value::format` is the one place
//! that turns "has no Text" into a printable placeholder.

use std::fmt;

use crate::diagnostics::ProgramStack;
use crate::environment::Environment;
use crate::keys;
use crate::location::SourceLocation;
use crate::trait_instance::Trait;
use crate::value::Value;

/// Rendered for values without a `Text` trait, or whose rendering failed.
pub const PLACEHOLDER: &str = "<value>";

/// A rendered string plus the location it was rendered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub location: Option<SourceLocation>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Text {
            text: text.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Trait<Text> {
    /// A constant `Text` instance.
    pub fn text(text: Text) -> Self {
        Trait::constant(keys::text(), text)
    }
}

impl Value {
    /// Render the value for display.
    ///
    /// Never fails. Missing `Text` and errors raised while deriving it both
    /// render as [`PLACEHOLDER`]. Derivation runs on a private copy of
    /// `stack` with recording off, so the caller's frames are untouched.
    pub fn format(&self, env: &mut Environment, stack: &ProgramStack) -> String {
        let mut probe = stack.clone();
        probe.disable_recording();

        match self.trait_if_present(keys::text(), env, &probe) {
            Ok(Some(text)) => text.text,
            Ok(None) => PLACEHOLDER.to_string(),
            Err(err) => {
                tracing::trace!(error = %err.message(), "rendering failed");
                PLACEHOLDER.to_string()
            }
        }
    }
}
