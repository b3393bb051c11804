//! # sql-automodel
//!
//! > **Point it at a dump. Get your models.**
//!
//! sql-automodel reads the `CREATE TABLE` statements out of an SQL dump and
//! turns each table into a model class.
//!
//! ## Quick Example
//!
//! ```rust
//! use sql_automodel::prelude::*;
//!
//! let dump = "CREATE TABLE `users` (\n  `id` INT,\n  `email` VARCHAR(255)\n);\n";
//! let tables = sql_automodel::parse_dump(dump)?;
//!
//! assert_eq!(tables[0].name, "users");
//! assert_eq!(tables[0].columns[0].resolved_type, ValueType::Int);
//! # Ok::<(), ParseError>(())
//! ```
//!
//! ## Pipeline
//!
//! | Stage     | Module        | Output                         |
//! |-----------|---------------|--------------------------------|
//! | Extract   | [`extractor`] | one string per statement       |
//! | Parse     | [`parser`]    | [`model::TableDescriptor`]     |
//! | Resolve   | [`types`]     | [`types::ValueType`] per column|
//! | Emit      | [`codegen`]   | Java or Rust source            |

pub mod codegen;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod model;
pub mod parser;
pub mod types;

pub mod prelude {
    pub use crate::codegen::{JavaEmitter, ModelEmitter, RustEmitter};
    pub use crate::config::{ErrorPolicy, GeneratorConfig, Target};
    pub use crate::error::*;
    pub use crate::extractor::{StatementExtractor, extract_statements};
    pub use crate::generator::{GenerationReport, Generator, TableOutcome};
    pub use crate::model::{ColumnDescriptor, TableDescriptor};
    pub use crate::parser::{ParserOptions, Tokenizer, parse_statement};
    pub use crate::types::{ValueType, resolve};
}

/// Extract and parse every table of a dump with the default options.
///
/// Fails on the first [`error::ParseError`]. Use [`generator::Generator`] for
/// per-table reporting and duplicate handling.
pub fn parse_dump(dump: &str) -> Result<Vec<model::TableDescriptor>, error::ParseError> {
    extractor::StatementExtractor::from_text(dump)
        .map(|statement| parser::parse_statement(&statement?))
        .collect()
}
