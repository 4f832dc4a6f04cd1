//! Error types for sqlcraft
//!
//! Errors fall into three families, matching the point at which they can occur:
//!
//! - [`SchemaError`]: raised while declaring columns and tables. Never retryable;
//!   the schema definition itself has to change.
//! - [`QueryError`]: raised while building a statement, before any I/O happens.
//! - [`ExecutionError`]: raised by [`Database`](crate::Database) when the driver
//!   reports a failure. The driver's error is kept as the source.

use crate::dialect::Dialect;
use thiserror::Error;

/// Result type alias for sqlcraft operations
pub type CraftResult<T> = Result<T, CraftError>;

/// Errors raised while constructing a [`ColumnSpec`](crate::ColumnSpec) or
/// [`TableSchema`](crate::TableSchema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The declared SQL type is empty or does not start with a type word.
    #[error("Invalid type '{sql_type}' for column '{column}'")]
    InvalidColumnType { column: String, sql_type: String },

    /// Two columns share a name (compared case-insensitively).
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// More than one autoincrement column, or one that is not a primary key.
    #[error("Invalid autoincrement in table '{table}': {reason}")]
    InvalidAutoincrement { table: String, reason: String },

    /// A table or column name is not a valid SQL identifier.
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// A column constraint contains something other than the known keywords.
    #[error("Invalid constraint '{constraint}' on column '{column}'")]
    InvalidConstraint { column: String, constraint: String },

    /// The table declares no columns.
    #[error("Table '{0}' must declare at least one column")]
    EmptyTable(String),

    /// A table-level key references a column the table does not declare.
    #[error("Table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },
}

impl SchemaError {
    pub(crate) fn identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a [`Statement`](crate::Statement).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// INSERT received a different number of columns and values.
    #[error("Column/value mismatch: {columns} columns, {values} values")]
    ColumnValueMismatch { columns: usize, values: usize },

    /// A column is not declared by the table the statement targets.
    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// `IN` was given an empty value set.
    #[error("IN on column '{column}' requires at least one value")]
    EmptyInSet { column: String },

    /// UPDATE was given no assignments.
    #[error("UPDATE on '{table}' requires at least one assignment")]
    EmptyUpdate { table: String },

    /// SELECT was given an explicit but empty column list.
    #[error("SELECT on '{table}' requires at least one column")]
    EmptyProjection { table: String },

    /// Multi-row INSERT was given no rows.
    #[error("INSERT into '{table}' requires at least one row")]
    EmptyInsert { table: String },

    /// INSERT named the same column more than once.
    #[error("Column '{column}' appears more than once in INSERT into '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A projection alias is not a valid column identifier.
    #[error("Invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },

    /// The statement was rendered for another placeholder dialect.
    #[error("Statement built for {found} cannot run on a {expected} connection")]
    DialectMismatch { expected: Dialect, found: Dialect },
}

impl QueryError {
    pub(crate) fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Errors raised while executing a statement.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Could not establish the connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver rejected or failed the statement.
    #[error("Driver failure: {0}")]
    DriverFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ExecutionError {
    /// Wrap a driver error.
    pub fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DriverFailure(Box::new(err))
    }
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum CraftError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl CraftError {
    /// Check if this error came from schema construction
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if this error came from statement building
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Check if this error is a wrapped driver failure
    pub fn is_driver_failure(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::DriverFailure(_)))
    }

    /// Borrow the driver error, if this is a driver failure.
    pub fn driver_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Execution(ExecutionError::DriverFailure(cause)) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<tokio_postgres::Error> for ExecutionError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::driver(err)
    }
}
