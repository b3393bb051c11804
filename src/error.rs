//! Error types for sql-automodel.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// What went wrong while extracting or parsing a `CREATE TABLE` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// A `CREATE TABLE` was opened but the dump ended before its closing line.
    UnterminatedStatement,
    /// No backtick-quoted identifier before the first `(`.
    NoTableName,
    /// A column type has no entry in the type lookup table.
    UnresolvedType,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::UnterminatedStatement => "unterminated statement",
            ParseErrorKind::NoTableName => "no table name",
            ParseErrorKind::UnresolvedType => "unresolved type",
        };
        f.write_str(name)
    }
}

/// A statement-level failure, carrying the text that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: '{offending_text}'")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offending_text: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offending_text: impl Into<String>) -> Self {
        Self {
            kind,
            offending_text: offending_text.into(),
        }
    }

    pub fn unterminated(partial: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::UnterminatedStatement, partial)
    }

    pub fn no_table_name(head: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::NoTableName, head)
    }

    pub fn unresolved_type(type_name: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::UnresolvedType, type_name)
    }
}

/// The main error type for a generation run.
#[derive(Debug, Error)]
pub enum AutoModelError {
    /// The SQL source path does not exist.
    #[error("SQL source file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The SQL source path exists but is not a regular file.
    #[error("Source is not a file: {}", .0.display())]
    SourceNotFile(PathBuf),

    /// The destination directory does not exist.
    #[error("Destination directory does not exist: {}", .0.display())]
    DestinationNotFound(PathBuf),

    /// The destination path exists but is not a directory.
    #[error("Destination is not a directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A parse error surfaced under the abort policy.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutoModelError {
    /// Whether this error belongs to the input family: bad paths or unreadable
    /// and unwritable files. These are fatal to the whole run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_)
                | Self::SourceNotFile(_)
                | Self::DestinationNotFound(_)
                | Self::DestinationNotDirectory(_)
                | Self::Io(_)
        )
    }
}

/// Result type alias for sql-automodel operations.
pub type AutoModelResult<T> = Result<T, AutoModelError>;
