//! Line-oriented `CREATE TABLE` statement extractor.
//!
//! A statement opens on any line containing the literal `CREATE TABLE` (or
//! `create table`) and runs until a later line, trimmed, starts with `)` and
//! ends with `;`. Everything outside a statement is ignored.
//!
//! ```text
//! -- noise                          ignored
//! CREATE TABLE `users` (            opens, seeded from the keyword
//!   `id` INT,                       trimmed and appended
//!   `email` VARCHAR(255)            trimmed and appended
//! ) ENGINE=InnoDB;                  closing line, cut after the last ';'
//! ```
//!
//! Matching is literal substring search, so a comment that mentions
//! `CREATE TABLE` opens a statement too. The opening line is never tested
//! against the closing pattern.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::ParseError;

static CLOSING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\).*;$").expect("closing-line pattern is valid"));

const KEYWORD_UPPER: &str = "CREATE TABLE";
const KEYWORD_LOWER: &str = "create table";

/// Iterator over the `CREATE TABLE` statements of a dump.
///
/// Yields every complete statement in order. If the input ends inside a
/// statement, the last item is an `UnterminatedStatement` error carrying the
/// partial text, and the iterator is exhausted afterwards.
pub struct StatementExtractor<I> {
    lines: I,
    finished: bool,
}

impl<I> StatementExtractor<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            finished: false,
        }
    }
}

impl<'a> StatementExtractor<std::str::Lines<'a>> {
    /// Extract from an in-memory dump.
    pub fn from_text(dump: &'a str) -> Self {
        Self::new(dump.lines())
    }
}

impl<I, S> Iterator for StatementExtractor<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<String, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(line) = self.lines.next() else {
                self.finished = true;
                return None;
            };
            let line = line.as_ref();
            let Some(start) = find_keyword(line) else {
                continue;
            };

            let mut statement = line[start..].to_string();
            loop {
                let Some(next) = self.lines.next() else {
                    self.finished = true;
                    warn!(partial = %statement, "dump ended inside a CREATE TABLE statement");
                    return Some(Err(ParseError::unterminated(statement)));
                };
                let trimmed = next.as_ref().trim();
                if is_closing_line(trimmed) {
                    let end = trimmed.rfind(';').map_or(trimmed.len(), |i| i + 1);
                    statement.push_str(&trimmed[..end]);
                    debug!(statement = %statement, "extracted CREATE TABLE statement");
                    return Some(Ok(statement));
                }
                statement.push_str(trimmed);
            }
        }
    }
}

/// Byte offset of the statement keyword, uppercase form first.
fn find_keyword(line: &str) -> Option<usize> {
    line.find(KEYWORD_UPPER)
        .or_else(|| line.find(KEYWORD_LOWER))
}

/// Whether a trimmed line closes the open statement.
pub fn is_closing_line(trimmed: &str) -> bool {
    CLOSING_LINE.is_match(trimmed)
}

/// Extract every `CREATE TABLE` statement from a dump.
///
/// Fails with `UnterminatedStatement` if the dump ends mid-statement. Use
/// [`StatementExtractor`] directly to keep the statements that precede it.
///
/// # Example
///
/// ```
/// use sql_automodel::extractor::extract_statements;
///
/// let dump = "CREATE TABLE `t` (\n`id` INT\n);\n";
/// let statements = extract_statements(dump).unwrap();
/// assert_eq!(statements, vec!["CREATE TABLE `t` (`id` INT);"]);
/// ```
pub fn extract_statements(dump: &str) -> Result<Vec<String>, ParseError> {
    StatementExtractor::from_text(dump).collect()
}
