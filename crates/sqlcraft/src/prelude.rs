//! Convenient imports for typical `sqlcraft` usage.
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//! ```

pub use crate::values;
pub use crate::{
    ColumnOptions, CraftError, CraftResult, Database, DatabaseConfig, Dialect, Predicate,
    Projection, SqlValue, Statement, StatementBuilder, TableSchema,
};
