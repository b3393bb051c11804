//! Table and column descriptors produced by the parser.

use serde::Serialize;

use crate::types::ValueType;

/// One column declaration, in the form the emitters consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Uppercased type name as declared, before alias resolution (e.g. `INT`).
    pub sql_type_name: String,
    pub resolved_type: ValueType,
}

/// A parsed `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// The extracted statement this table was built from.
    pub source_statement: String,
}

impl TableDescriptor {
    /// (column name, value type) pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.columns
            .iter()
            .map(|col| (col.name.as_str(), col.resolved_type))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|col| col.name == name)
    }
}
