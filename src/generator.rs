//! Generation runs: dump in, model files out.
//!
//! A run extracts every `CREATE TABLE` statement, parses each one, applies the
//! configured [`ErrorPolicy`] to failures, and keeps one descriptor per table
//! name (the last statement wins). [`Generator::generate`] then writes one file
//! per table through the configured emitter.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ErrorPolicy, GeneratorConfig};
use crate::error::{AutoModelError, AutoModelResult, ParseError};
use crate::extractor::StatementExtractor;
use crate::model::TableDescriptor;
use crate::parser::{find_backticked_name, parse_statement_with};

/// Result of one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Parsed; the table is in the report.
    Generated { table: String, columns: usize },
    /// Parsed, but a later statement with the same table name replaced it.
    Superseded { table: String },
    /// Extraction or parsing failed; nothing is emitted for this statement.
    Failed {
        table: Option<String>,
        error: ParseError,
    },
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// One descriptor per table name, in first-seen order.
    pub tables: Vec<TableDescriptor>,
    /// One outcome per extracted statement, in dump order.
    pub outcomes: Vec<TableOutcome>,
    /// Files written by [`Generator::generate`].
    pub written: Vec<PathBuf>,
    /// The subset of `written` that are emitter support files.
    pub support: Vec<PathBuf>,
    /// Files written more than once in this run because two tables map to
    /// the same file name. The last table written wins.
    pub collisions: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            TableOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    /// True when no statement failed.
    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Written model files, support files excluded.
    pub fn models(&self) -> impl Iterator<Item = &Path> {
        self.written
            .iter()
            .filter(|path| !self.support.contains(*path))
            .map(PathBuf::as_path)
    }
}

/// Model files written by more than one report, in first-seen order.
///
/// Runs sharing a destination overwrite each other's files for such paths,
/// and which run finishes last is not defined.
pub fn shared_outputs<'a>(reports: impl IntoIterator<Item = &'a GenerationReport>) -> Vec<PathBuf> {
    let mut owners: IndexMap<&'a Path, usize> = IndexMap::new();
    for report in reports {
        let models: IndexSet<&Path> = report.models().collect();
        for path in models {
            *owners.entry(path).or_default() += 1;
        }
    }
    owners
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(path, _)| path.to_path_buf())
        .collect()
}

/// Runs the extract → parse → emit pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Parse a dump held in memory. Writes nothing.
    ///
    /// Under [`ErrorPolicy::Abort`] the first [`ParseError`] is returned as
    /// [`AutoModelError::Parse`]; under [`ErrorPolicy::Continue`] it is
    /// recorded in the report and the run goes on.
    pub fn run_text(&self, dump: &str) -> AutoModelResult<GenerationReport> {
        let options = self.config.parser_options();
        let mut tables: IndexMap<String, TableDescriptor> = IndexMap::new();
        let mut outcomes = Vec::new();

        for item in StatementExtractor::from_text(dump) {
            let (name, parsed) = match item {
                Ok(statement) => (
                    statement_table_name(&statement),
                    parse_statement_with(&statement, &options),
                ),
                Err(error) => (statement_table_name(&error.offending_text), Err(error)),
            };

            match parsed {
                Ok(table) => {
                    if tables.contains_key(&table.name) {
                        debug!(table = %table.name, "later definition replaces earlier one");
                        supersede(&mut outcomes, &table.name);
                    }
                    outcomes.push(TableOutcome::Generated {
                        table: table.name.clone(),
                        columns: table.columns.len(),
                    });
                    tables.insert(table.name.clone(), table);
                }
                Err(error) => {
                    if self.config.error_policy == ErrorPolicy::Abort {
                        return Err(error.into());
                    }
                    // The failed definition is the last one seen, so an earlier
                    // good one must not be emitted.
                    if let Some(name) = name.as_deref()
                        && tables.shift_remove(name).is_some()
                    {
                        debug!(table = %name, "failed definition replaces earlier one");
                        supersede(&mut outcomes, name);
                    }
                    warn!(table = name.as_deref().unwrap_or("?"), %error, "skipping statement");
                    outcomes.push(TableOutcome::Failed { table: name, error });
                }
            }
        }

        Ok(GenerationReport {
            tables: tables.into_values().collect(),
            outcomes,
            ..GenerationReport::default()
        })
    }

    /// Generate model files for `source` into `destination`.
    ///
    /// Both paths are checked before anything is read. The dump is decoded
    /// lossily, so invalid UTF-8 in comments or data lines is tolerated.
    pub fn generate(&self, source: &Path, destination: &Path) -> AutoModelResult<GenerationReport> {
        validate_paths(source, destination)?;

        let bytes = fs::read(source)?;
        let mut report = self.run_text(&decode_dump(&bytes))?;
        if report.tables.is_empty() {
            info!(source = %source.display(), "no tables to generate");
            return Ok(report);
        }

        let emitter = self.config.target.emitter();
        let namespace = self.config.package.as_str();

        let mut claimed = HashSet::new();
        for (relative, content) in emitter.support_files(namespace) {
            let path = write_file(destination, &relative, &content)?;
            claimed.insert(relative);
            report.support.push(path.clone());
            report.written.push(path);
        }
        for table in &report.tables {
            let relative = emitter.file_name(table, namespace);
            if !claimed.insert(relative.clone()) {
                warn!(table = %table.name, path = %relative.display(), "file name already used in this run, overwriting");
                report.collisions.push(destination.join(&relative));
            }
            let content = emitter.emit(table, namespace);
            let path = write_file(destination, &relative, &content)?;
            info!(table = %table.name, path = %path.display(), "wrote model");
            report.written.push(path);
        }

        Ok(report)
    }
}

/// Check that the source is a file and the destination a directory.
pub fn validate_paths(source: &Path, destination: &Path) -> AutoModelResult<()> {
    if !source.exists() {
        return Err(AutoModelError::SourceNotFound(source.to_path_buf()));
    }
    if !source.is_file() {
        return Err(AutoModelError::SourceNotFile(source.to_path_buf()));
    }
    if !destination.exists() {
        return Err(AutoModelError::DestinationNotFound(destination.to_path_buf()));
    }
    if !destination.is_dir() {
        return Err(AutoModelError::DestinationNotDirectory(destination.to_path_buf()));
    }
    Ok(())
}

/// Decode dump bytes, replacing invalid UTF-8 sequences.
pub fn decode_dump(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn write_file(destination: &Path, relative: &Path, content: &str) -> AutoModelResult<PathBuf> {
    let path = destination.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

fn supersede(outcomes: &mut [TableOutcome], name: &str) {
    for outcome in outcomes.iter_mut() {
        if matches!(&*outcome, TableOutcome::Generated { table, .. } if table == name) {
            *outcome = TableOutcome::Superseded {
                table: name.to_string(),
            };
        }
    }
}

/// Backtick name in the head of a (possibly partial) statement.
fn statement_table_name(statement: &str) -> Option<String> {
    let head = statement.split_once('(').map_or(statement, |(head, _)| head);
    let name = find_backticked_name(head);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::types::ValueType;

    const DUMP: &str = "\
CREATE TABLE `users` (
  `id` INT,
  `email` VARCHAR(255)
);
CREATE TABLE `broken` (
  `id` INT,
  `col` FOOBAR
);
CREATE TABLE `posts` (
  `id` BIGINT,
  `body` CLOB
);
";

    fn generator(policy: ErrorPolicy) -> Generator {
        Generator::new(GeneratorConfig {
            error_policy: policy,
            ..GeneratorConfig::default()
        })
    }

    #[test]
    fn test_continue_policy_collects_errors() {
        let report = generator(ErrorPolicy::Continue).run_text(DUMP).unwrap();
        let names: Vec<_> = report.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "posts"]);
        assert!(!report.is_clean());
        assert_eq!(
            report.outcomes[1],
            TableOutcome::Failed {
                table: Some("broken".to_string()),
                error: ParseError::unresolved_type("FOOBAR"),
            }
        );
    }

    #[test]
    fn test_abort_policy_stops_at_first_error() {
        let err = generator(ErrorPolicy::Abort).run_text(DUMP).unwrap_err();
        match err {
            AutoModelError::Parse(error) => {
                assert_eq!(error.kind, ParseErrorKind::UnresolvedType);
                assert_eq!(error.offending_text, "FOOBAR");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_last_seen_wins() {
        let dump = "\
CREATE TABLE `t` (
`a` INT
);
CREATE TABLE `u` (
`a` INT
);
CREATE TABLE `t` (
`b` DATE,
`c` TIME
);
";
        let report = Generator::default().run_text(dump).unwrap();
        assert_eq!(report.tables.len(), 2);
        let t = report.table("t").unwrap();
        let fields: Vec<_> = t.fields().collect();
        assert_eq!(fields, vec![("b", ValueType::Date), ("c", ValueType::Time)]);
        assert_eq!(report.outcomes[0], TableOutcome::Superseded { table: "t".to_string() });
        assert!(report.is_clean());
    }

    #[test]
    fn test_failed_redefinition_drops_earlier_table() {
        let dump = "\
CREATE TABLE `t` (
`a` INT
);
CREATE TABLE `u` (
`a` INT
);
CREATE TABLE `t` (
`a` INT,
`b` FOOBAR
);
";
        let report = Generator::default().run_text(dump).unwrap();
        let names: Vec<_> = report.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["u"]);
        assert_eq!(
            report.outcomes,
            vec![
                TableOutcome::Superseded { table: "t".to_string() },
                TableOutcome::Generated { table: "u".to_string(), columns: 1 },
                TableOutcome::Failed {
                    table: Some("t".to_string()),
                    error: ParseError::unresolved_type("FOOBAR"),
                },
            ]
        );
    }

    #[test]
    fn test_good_after_failed_definition_is_kept() {
        let dump = "CREATE TABLE `t` (\n`b` FOOBAR\n);\nCREATE TABLE `t` (\n`a` INT\n);\n";
        let report = Generator::default().run_text(dump).unwrap();
        assert_eq!(report.table("t").map(|t| t.columns.len()), Some(1));
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn test_shared_outputs() {
        let report = |paths: &[&str]| GenerationReport {
            written: paths.iter().map(PathBuf::from).collect(),
            support: vec![PathBuf::from("AbstractModel.java")],
            ..GenerationReport::default()
        };
        let first = report(&["AbstractModel.java", "users.java", "orders.java"]);
        let second = report(&["AbstractModel.java", "users.java"]);
        let third = report(&["AbstractModel.java", "orders.java", "items.java"]);

        assert_eq!(
            shared_outputs([&first, &second, &third]),
            vec![PathBuf::from("users.java"), PathBuf::from("orders.java")]
        );
        assert!(shared_outputs([&first]).is_empty());
    }

    #[test]
    fn test_unterminated_tail_under_continue() {
        let dump = "CREATE TABLE `a` (\n`id` INT\n);\nCREATE TABLE `b` (\n`id` INT\n";
        let report = Generator::default().run_text(dump).unwrap();
        assert_eq!(report.tables.len(), 1);
        match &report.outcomes[1] {
            TableOutcome::Failed { table, error } => {
                assert_eq!(table.as_deref(), Some("b"));
                assert_eq!(error.kind, ParseErrorKind::UnterminatedStatement);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_no_table_name_is_skipped() {
        let dump = "CREATE TABLE users (\n`id` INT\n);\n";
        let report = Generator::default().run_text(dump).unwrap();
        assert!(report.tables.is_empty());
        assert_eq!(report.errors().next().map(|e| e.kind), Some(ParseErrorKind::NoTableName));
    }

    #[test]
    fn test_decode_dump_is_lossy() {
        let bytes = b"-- \xff\xfe noise\nCREATE TABLE `t` (\n`id` INT\n);\n";
        let report = Generator::default().run_text(&decode_dump(bytes)).unwrap();
        assert_eq!(report.tables.len(), 1);
    }
}
