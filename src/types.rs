//! SQL type name → value type lookup table.
//!
//! The canonical table is a static slice, so it is fully built before any parse
//! starts and is never mutated. `INT` lives in a separate alias table and is
//! consulted first; it never appears in reverse lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic value type a column resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Arbitrary-precision decimal.
    Decimal,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// UTF-8 text.
    Text,
    /// Byte sequence.
    Bytes,
    /// Large character object.
    Clob,
    /// Large binary object.
    Blob,
    /// Row identifier.
    RowId,
    /// XML document.
    Xml,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Byte => "byte",
            ValueType::Short => "short",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Decimal => "decimal",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Text => "text",
            ValueType::Bytes => "bytes",
            ValueType::Clob => "clob",
            ValueType::Blob => "blob",
            ValueType::RowId => "rowid",
            ValueType::Xml => "xml",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Canonical SQL type names, in declaration order.
pub const TYPE_MAPPING: &[(&str, ValueType)] = &[
    ("TINYINT", ValueType::Byte),
    ("SMALLINT", ValueType::Short),
    ("INTEGER", ValueType::Int),
    ("BIGINT", ValueType::Long),
    ("DECIMAL", ValueType::Decimal),
    ("NUMERIC", ValueType::Decimal),
    ("REAL", ValueType::Float),
    ("DOUBLE", ValueType::Double),
    ("CHAR", ValueType::Text),
    ("VARCHAR", ValueType::Text),
    ("BINARY", ValueType::Bytes),
    ("VARBINARY", ValueType::Bytes),
    ("CLOB", ValueType::Clob),
    ("BLOB", ValueType::Blob),
    ("ROWID", ValueType::RowId),
    ("SQLXML", ValueType::Xml),
    ("DATE", ValueType::Date),
    ("TIME", ValueType::Time),
    ("TIMESTAMP", ValueType::Timestamp),
];

/// Aliases that resolve to a canonical name without being one.
pub const ALIASES: &[(&str, &str)] = &[("INT", "INTEGER")];

/// Resolve a SQL type name to its value type.
///
/// The match is case-sensitive; callers holding user input uppercase it first.
///
/// # Example
///
/// ```
/// use sql_automodel::types::{resolve, ValueType};
///
/// assert_eq!(resolve("INT"), Some(ValueType::Int));
/// assert_eq!(resolve("int"), None);
/// ```
pub fn resolve(sql_type_name: &str) -> Option<ValueType> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == sql_type_name)
        .map(|(_, target)| *target)
        .unwrap_or(sql_type_name);

    TYPE_MAPPING
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, value_type)| *value_type)
}

/// First canonical SQL name for a value type. Aliases are never returned.
pub fn canonical_name(value_type: ValueType) -> Option<&'static str> {
    TYPE_MAPPING
        .iter()
        .find(|(_, vt)| *vt == value_type)
        .map(|(name, _)| *name)
}

/// Whether `name` is in the canonical table (aliases excluded).
pub fn is_canonical(name: &str) -> bool {
    TYPE_MAPPING.iter().any(|(canonical, _)| *canonical == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_int_alias_matches_integer() {
        assert_eq!(resolve("INT"), resolve("INTEGER"));
        assert_eq!(resolve("INT"), Some(ValueType::Int));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(resolve("int"), None);
        assert_eq!(resolve("varchar"), None);
        assert_eq!(resolve("VARCHAR"), Some(ValueType::Text));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(resolve("FOOBAR"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_canonical_names_unique() {
        let names: HashSet<_> = TYPE_MAPPING.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), TYPE_MAPPING.len());
    }

    #[test]
    fn test_reverse_lookup_skips_alias() {
        assert_eq!(canonical_name(ValueType::Int), Some("INTEGER"));
        assert_eq!(canonical_name(ValueType::Decimal), Some("DECIMAL"));
        assert_eq!(canonical_name(ValueType::Text), Some("CHAR"));
        assert!(!is_canonical("INT"));
        assert!(is_canonical("SQLXML"));
    }

    #[test]
    fn test_every_value_type_has_a_name() {
        for (name, value_type) in TYPE_MAPPING {
            assert_eq!(resolve(name), Some(*value_type));
            assert!(canonical_name(*value_type).is_some());
        }
    }
}
