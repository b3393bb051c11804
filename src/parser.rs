//! `CREATE TABLE` statement parser.
//!
//! Turns one extracted statement into a [`TableDescriptor`].
//!
//! # Statement Layout
//!
//! ```text
//! CREATE TABLE `users` (`id` INT,`email` VARCHAR(255)) ENGINE=InnoDB;
//! ──────────┬───────── ───────────────┬──────────────── ──────┬──────
//!           │                         │                       │
//!           │                         │                       └── Trailing clauses (discarded)
//!           │                         └── Body, up to the last ')'
//!           └── Head, up to the first '('
//! ```
//!
//! The body is split on commas without regard for nesting, so
//! `DECIMAL(10,2)` becomes two tokens and the second one fails to resolve.
//! [`Tokenizer::ParenAware`] is the opt-in alternative.

use std::sync::LazyLock;

use clap::ValueEnum;
use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::{multispace0, multispace1},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::model::{ColumnDescriptor, TableDescriptor};
use crate::types::resolve;

static BACKTICKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("backtick pattern is valid"));

/// How the column body is split into declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tokenizer {
    /// Split on every comma.
    #[default]
    Naive,
    /// Split only on commas outside parentheses.
    ParenAware,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub tokenizer: Tokenizer,
}

/// Parse a statement with the default (naive) tokenizer.
///
/// # Example
///
/// ```
/// use sql_automodel::parser::parse_statement;
/// use sql_automodel::types::ValueType;
///
/// let table = parse_statement("CREATE TABLE `users` (`id` INT,`email` VARCHAR(255));").unwrap();
/// assert_eq!(table.name, "users");
/// assert_eq!(table.columns[1].resolved_type, ValueType::Text);
/// ```
pub fn parse_statement(statement: &str) -> Result<TableDescriptor, ParseError> {
    parse_statement_with(statement, &ParserOptions::default())
}

/// Parse a statement with explicit options.
pub fn parse_statement_with(
    statement: &str,
    options: &ParserOptions,
) -> Result<TableDescriptor, ParseError> {
    let (head, remainder) = statement.split_once('(').unwrap_or((statement, ""));

    let name = find_backticked_name(head);
    if name.is_empty() {
        return Err(ParseError::no_table_name(head.trim()));
    }

    let body = match remainder.rfind(')') {
        Some(close) => &remainder[..=close],
        None => "",
    };

    let columns = tokenize_columns(body, options.tokenizer)
        .into_iter()
        .filter(|token| !token.trim().is_empty())
        .map(parse_column)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TableDescriptor {
        name: name.to_string(),
        columns,
        source_statement: statement.to_string(),
    })
}

/// First identifier enclosed in a pair of backticks, or `""` if there is none.
pub fn find_backticked_name(s: &str) -> &str {
    BACKTICKED
        .captures(s)
        .and_then(|cap| cap.get(1))
        .map_or("", |m| m.as_str())
}

/// Split the column body into raw declaration tokens.
pub fn tokenize_columns(body: &str, tokenizer: Tokenizer) -> Vec<&str> {
    match tokenizer {
        Tokenizer::Naive => body.split(',').collect(),
        Tokenizer::ParenAware => {
            let mut tokens = Vec::new();
            let mut depth = 0usize;
            let mut start = 0;
            for (i, c) in body.char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    ',' if depth == 0 => {
                        tokens.push(&body[start..i]);
                        start = i + 1;
                    }
                    _ => {}
                }
            }
            tokens.push(&body[start..]);
            tokens
        }
    }
}

/// Build a column from one declaration token such as `` `email` VARCHAR(255) ``.
pub fn parse_column(token: &str) -> Result<ColumnDescriptor, ParseError> {
    let name = find_backticked_name(token);

    let sql_type_name = match declared_type(token) {
        Ok((_, stem)) => stem.to_uppercase(),
        Err(_) => return Err(ParseError::unresolved_type(token.trim())),
    };

    let resolved_type =
        resolve(&sql_type_name).ok_or_else(|| ParseError::unresolved_type(&sql_type_name))?;

    Ok(ColumnDescriptor {
        name: name.to_string(),
        sql_type_name,
        resolved_type,
    })
}

/// Second whitespace-separated word of a token, cut at the first paren.
fn declared_type(token: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(token)?;
    let (input, _) = take_till1(char::is_whitespace).parse(input)?;
    let (input, _) = multispace1(input)?;
    // Stopping at ')' as well lets the last column's `INT)` resolve as INT;
    // a stem that only drops a balanced `(..)` group would leave `INT)`.
    take_till1(|c: char| c.is_whitespace() || c == '(' || c == ')').parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::types::ValueType;

    #[test]
    fn test_users_table() {
        let table = parse_statement("CREATE TABLE `users` (`id` INT,`email` VARCHAR(255));").unwrap();
        assert_eq!(table.name, "users");
        let fields: Vec<_> = table.fields().collect();
        assert_eq!(fields, vec![("id", ValueType::Int), ("email", ValueType::Text)]);
    }

    #[test]
    fn test_trailing_clauses_discarded() {
        let stmt = "CREATE TABLE `t` (`id` BIGINT,`at` TIMESTAMP) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='x, y';";
        let table = parse_statement(stmt).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].resolved_type, ValueType::Timestamp);
        assert_eq!(table.source_statement, stmt);
    }

    #[test]
    fn test_last_column_without_args() {
        // The body keeps the table's closing paren, so the last token is "`b` INT)".
        let table = parse_statement("CREATE TABLE `t` (`a` VARCHAR(3),`b` INT);").unwrap();
        assert_eq!(table.columns[1].name, "b");
        assert_eq!(table.columns[1].sql_type_name, "INT");
    }

    #[test]
    fn test_lowercase_types_are_uppercased() {
        let table = parse_statement("create table `t` (`a` int(11) NOT NULL,`b` varchar(20) DEFAULT NULL);").unwrap();
        assert_eq!(table.columns[0].sql_type_name, "INT");
        assert_eq!(table.columns[0].resolved_type, ValueType::Int);
        assert_eq!(table.columns[1].resolved_type, ValueType::Text);
    }

    #[test]
    fn test_type_args_ignored() {
        for (decl, expected) in [
            ("`n` TINYINT(1)", ValueType::Byte),
            ("`n` CHAR(36)", ValueType::Text),
            ("`n` VARBINARY(16)", ValueType::Bytes),
            ("`n` TIMESTAMP(6)", ValueType::Timestamp),
            ("`n` NUMERIC(12)", ValueType::Decimal),
        ] {
            let col = parse_column(decl).unwrap();
            assert_eq!(col.name, "n");
            assert_eq!(col.resolved_type, expected, "{decl}");
        }
    }

    #[test]
    fn test_no_table_name() {
        let err = parse_statement("CREATE TABLE users (`id` INT);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoTableName);
        assert_eq!(err.offending_text, "CREATE TABLE users");
    }

    #[test]
    fn test_table_name_only_searched_in_head() {
        let err = parse_statement("CREATE TABLE (`id` INT);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoTableName);
    }

    #[test]
    fn test_unresolved_type() {
        let err = parse_statement("CREATE TABLE `t` (`id` INT,`col` FOOBAR);").unwrap_err();
        assert_eq!(err, ParseError::unresolved_type("FOOBAR"));
    }

    #[test]
    fn test_naive_tokenizer_splits_decimal() {
        let err = parse_statement("CREATE TABLE `p` (`price` DECIMAL(10,2));").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnresolvedType);
        assert_eq!(err.offending_text, "2))");
    }

    #[test]
    fn test_paren_aware_tokenizer_keeps_decimal() {
        let options = ParserOptions {
            tokenizer: Tokenizer::ParenAware,
        };
        let table =
            parse_statement_with("CREATE TABLE `p` (`price` DECIMAL(10,2),`qty` SMALLINT);", &options).unwrap();
        let fields: Vec<_> = table.fields().collect();
        assert_eq!(fields, vec![("price", ValueType::Decimal), ("qty", ValueType::Short)]);
    }

    #[test]
    fn test_tokenize_columns() {
        let body = "`a` DECIMAL(10,2),`b` INT)";
        assert_eq!(
            tokenize_columns(body, Tokenizer::Naive),
            vec!["`a` DECIMAL(10", "2)", "`b` INT)"]
        );
        assert_eq!(
            tokenize_columns(body, Tokenizer::ParenAware),
            vec!["`a` DECIMAL(10,2)", "`b` INT)"]
        );
    }

    #[test]
    fn test_backticked_name_is_pure() {
        let s = "CREATE TABLE `orders` ";
        let first = find_backticked_name(s);
        for _ in 0..3 {
            assert_eq!(find_backticked_name(s), first);
        }
        assert_eq!(first, "orders");
        assert_eq!(find_backticked_name("no ticks"), "");
        assert_eq!(find_backticked_name("`a` and `b`"), "a");
    }

    #[test]
    fn test_statement_without_body() {
        let table = parse_statement("CREATE TABLE `empty` LIKE `other`;").unwrap();
        assert_eq!(table.name, "empty");
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_token_without_type() {
        let err = parse_column("`lonely`").unwrap_err();
        assert_eq!(err, ParseError::unresolved_type("`lonely`"));
    }
}
