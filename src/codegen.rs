//! Model emitters.
//!
//! An emitter turns one [`TableDescriptor`] into the text of one source file.
//! Field types come from each column's resolved [`ValueType`]; descriptors
//! never carry unresolved columns, so every emitted field has a real type.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

use crate::model::TableDescriptor;
use crate::types::ValueType;

/// Turns table descriptors into source files for one target language.
pub trait ModelEmitter: Send + Sync {
    /// Path of the generated file, relative to the destination directory.
    fn file_name(&self, table: &TableDescriptor, namespace: &str) -> PathBuf;

    /// Source text for one table.
    fn emit(&self, table: &TableDescriptor, namespace: &str) -> String;

    /// Extra files the generated models depend on, written once per run.
    fn support_files(&self, _namespace: &str) -> Vec<(PathBuf, String)> {
        Vec::new()
    }
}

/// Identifier for a column, falling back to `column<index>` when the
/// declaration had no backtick name. Characters outside `[A-Za-z0-9_]` become `_`.
pub fn field_identifier(name: &str, index: usize) -> String {
    if name.is_empty() {
        return format!("column{}", index);
    }
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Convert snake_case to PascalCase for type names.
///
/// # Example
/// ```
/// use sql_automodel::codegen::to_pascal_case;
///
/// assert_eq!(to_pascal_case("order_items"), "OrderItems");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == ' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

// ============================================================================
// Java
// ============================================================================

/// Emits `public final class <table> extends AbstractModel` with public fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaEmitter;

const JAVA_KEYWORDS: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

impl JavaEmitter {
    /// Java field type and the import it needs, if any.
    pub fn java_type(value_type: ValueType) -> (&'static str, Option<&'static str>) {
        match value_type {
            ValueType::Byte => ("Byte", None),
            ValueType::Short => ("Short", None),
            ValueType::Int => ("Integer", None),
            ValueType::Long => ("Long", None),
            ValueType::Decimal => ("BigDecimal", Some("java.math.BigDecimal")),
            ValueType::Float => ("Float", None),
            ValueType::Double => ("Double", None),
            ValueType::Text => ("String", None),
            ValueType::Bytes => ("byte[]", None),
            ValueType::Clob => ("Clob", Some("java.sql.Clob")),
            ValueType::Blob => ("Blob", Some("java.sql.Blob")),
            ValueType::RowId => ("RowId", Some("java.sql.RowId")),
            ValueType::Xml => ("SQLXML", Some("java.sql.SQLXML")),
            ValueType::Date => ("Date", Some("java.sql.Date")),
            ValueType::Time => ("Time", Some("java.sql.Time")),
            ValueType::Timestamp => ("Timestamp", Some("java.sql.Timestamp")),
        }
    }

    /// Field name with a `_` suffix when it would be a reserved word.
    pub fn java_field(name: &str, index: usize) -> String {
        let mut ident = field_identifier(name, index);
        if JAVA_KEYWORDS.contains(&ident.as_str()) {
            ident.push('_');
        }
        ident
    }

    fn package_dir(namespace: &str) -> PathBuf {
        namespace
            .split('.')
            .filter(|part| !part.is_empty())
            .collect()
    }

    fn write_package(out: &mut String, namespace: &str) {
        if !namespace.is_empty() {
            let _ = writeln!(out, "package {};", namespace);
            out.push('\n');
        }
    }
}

impl ModelEmitter for JavaEmitter {
    fn file_name(&self, table: &TableDescriptor, namespace: &str) -> PathBuf {
        Self::package_dir(namespace).join(format!("{}.java", field_identifier(&table.name, 0)))
    }

    fn emit(&self, table: &TableDescriptor, namespace: &str) -> String {
        let class_name = field_identifier(&table.name, 0);
        let mut out = String::new();
        Self::write_package(&mut out, namespace);

        let imports: BTreeSet<&str> = table
            .columns
            .iter()
            .filter_map(|col| Self::java_type(col.resolved_type).1)
            .collect();
        if !imports.is_empty() {
            for import in &imports {
                let _ = writeln!(out, "import {};", import);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "public final class {} extends AbstractModel {{", class_name);
        for (i, col) in table.columns.iter().enumerate() {
            let (java_type, _) = Self::java_type(col.resolved_type);
            let _ = writeln!(out, "  public {} {};", java_type, Self::java_field(&col.name, i));
            out.push('\n');
        }
        let _ = writeln!(out, "  public {}() {{", class_name);
        let _ = writeln!(out, "    super(\"{}\");", java_escape(&table.source_statement));
        out.push_str("  }\n");
        out.push_str("}\n");
        out
    }

    fn support_files(&self, namespace: &str) -> Vec<(PathBuf, String)> {
        let mut out = String::new();
        Self::write_package(&mut out, namespace);
        out.push_str("public abstract class AbstractModel {\n");
        out.push_str("  public final String generatedFrom;\n\n");
        out.push_str("  protected AbstractModel(String generatedFrom) {\n");
        out.push_str("    this.generatedFrom = generatedFrom;\n");
        out.push_str("  }\n");
        out.push_str("}\n");
        vec![(Self::package_dir(namespace).join("AbstractModel.java"), out)]
    }
}

fn java_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Rust
// ============================================================================

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// Emits `pub struct <PascalCase>` with one `pub` field per column.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEmitter;

impl RustEmitter {
    pub fn rust_type(value_type: ValueType) -> &'static str {
        match value_type {
            ValueType::Byte => "i8",
            ValueType::Short => "i16",
            ValueType::Int => "i32",
            ValueType::Long => "i64",
            ValueType::Decimal => "rust_decimal::Decimal",
            ValueType::Float => "f32",
            ValueType::Double => "f64",
            ValueType::Text | ValueType::Clob | ValueType::Xml | ValueType::RowId => "String",
            ValueType::Bytes | ValueType::Blob => "Vec<u8>",
            ValueType::Date => "chrono::NaiveDate",
            ValueType::Time => "chrono::NaiveTime",
            ValueType::Timestamp => "chrono::NaiveDateTime",
        }
    }

    fn rust_field(name: &str, index: usize) -> String {
        let ident = field_identifier(name, index).to_lowercase();
        if RUST_KEYWORDS.contains(&ident.as_str()) {
            format!("r#{}", ident)
        } else {
            ident
        }
    }
}

impl ModelEmitter for RustEmitter {
    fn file_name(&self, table: &TableDescriptor, _namespace: &str) -> PathBuf {
        PathBuf::from(format!("{}.rs", field_identifier(&table.name, 0).to_lowercase()))
    }

    fn emit(&self, table: &TableDescriptor, namespace: &str) -> String {
        let mut out = String::new();
        if namespace.is_empty() {
            let _ = writeln!(out, "//! Model for the `{}` table.", table.name);
        } else {
            let _ = writeln!(out, "//! Model for the `{}` table ({}).", table.name, namespace);
        }
        out.push('\n');

        let struct_name = to_pascal_case(&field_identifier(&table.name, 0));
        out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
        let _ = writeln!(out, "pub struct {} {{", struct_name);
        for (i, col) in table.columns.iter().enumerate() {
            let _ = writeln!(
                out,
                "    pub {}: {},",
                Self::rust_field(&col.name, i),
                Self::rust_type(col.resolved_type)
            );
        }
        out.push_str("}\n\n");

        let _ = writeln!(out, "impl {} {{", struct_name);
        let _ = writeln!(
            out,
            "    pub const GENERATED_FROM: &'static str = {:?};",
            table.source_statement
        );
        out.push_str("}\n");
        out
    }
}
