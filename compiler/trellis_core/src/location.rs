//! Source locations attached to values for diagnostics.

use std::fmt;
use std::path::PathBuf;

/// Where a value came from in the program text.
///
/// Attached by the parser and carried through evaluation purely for
/// diagnostics; it never takes part in dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// File the value was read from, if any (`None` for inline code).
    pub file: Option<PathBuf>,
    /// One-based line.
    pub line: usize,
    /// One-based column.
    pub column: usize,
}

impl SourceLocation {
    /// Location inside inline code with no backing file.
    pub fn inline(line: usize, column: usize) -> Self {
        SourceLocation {
            file: None,
            line,
            column,
        }
    }

    /// Location inside a file.
    pub fn in_file(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        SourceLocation {
            file: Some(file.into()),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}
