//! In-memory schema model: columns, tables and their constraints.
//!
//! A [`TableSchema`] is validated once when it is built and never changes
//! afterwards. Statement builders rely on two of its guarantees: column names
//! are unique (case-insensitively), and [`TableSchema::column_names`] always
//! returns declaration order.

mod column;
mod table;

pub use column::{ColumnOptions, ColumnSpec};
pub use table::{ForeignKey, ReferentialAction, TableSchema, TableSchemaBuilder};
