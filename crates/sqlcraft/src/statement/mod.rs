//! Rendered statements and the builder that produces them.
//!
//! Every builder operation is a pure function of its inputs: the same schema,
//! columns, values and predicate always give a byte-identical [`Statement`].
//!
//! # Unfiltered statements
//!
//! `select`, `update` and `delete` accept `None` as predicate. That is a
//! full-table operation with no WHERE clause, exactly as in plain SQL. It is
//! allowed on purpose; [`Statement::is_filtered`] reports it and
//! [`Database`](crate::Database) logs a warning before running an unfiltered
//! UPDATE or DELETE.

mod builder;
mod select;

#[cfg(test)]
mod tests;

pub use builder::StatementBuilder;
pub use select::{Aggregate, Order, Projection, SelectItem, SelectQuery};

use crate::dialect::Dialect;
use crate::value::SqlValue;
use std::fmt;

/// The kind of SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    CreateTable,
    DropTable,
    Insert,
    Select,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::CreateTable => "create_table",
            StatementKind::DropTable => "drop_table",
            StatementKind::Insert => "insert",
            StatementKind::Select => "select",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL text plus its ordered parameters.
///
/// Parameter `i` belongs to the `i`-th placeholder in [`sql`](Self::sql).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
    kind: StatementKind,
    dialect: Dialect,
    filtered: bool,
}

impl Statement {
    pub(crate) fn new(
        sql: String,
        params: Vec<SqlValue>,
        kind: StatementKind,
        dialect: Dialect,
        filtered: bool,
    ) -> Self {
        Self {
            sql,
            params,
            kind,
            dialect,
            filtered,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Dialect the placeholders were rendered for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether the statement carries a WHERE clause.
    ///
    /// Always `true` for statements that cannot have one (CREATE, DROP, INSERT).
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// UPDATE or DELETE without a WHERE clause.
    pub fn is_unguarded_write(&self) -> bool {
        matches!(self.kind, StatementKind::Update | StatementKind::Delete) && !self.filtered
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
