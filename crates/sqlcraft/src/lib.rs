//! # sqlcraft
//!
//! Declarative table schemas and injection-safe SQL statements over a raw driver.
//!
//! ## Features
//!
//! - **Validated schemas**: columns and tables are checked once, when declared
//! - **Bound values only**: every value travels as a parameter; identifiers come
//!   from the schema, never from caller strings
//! - **Composable predicates**: AND/OR/NOT trees with correct parenthesization
//! - **Dialect aware**: `?` or `$n` placeholders, per-dialect autoincrement
//! - **Thin execution**: [`Database`] hands SQL and parameters to a
//!   [`Connection`] and gives back its rows, logging through `tracing`
//!
//! ## Example
//!
//! ```
//! use sqlcraft::{values, ColumnOptions, Dialect, Predicate, StatementBuilder, TableSchema};
//!
//! let users = TableSchema::builder("user_table")
//!     .column_with("user_id", "INT", ColumnOptions::new().primary_key().autoincrement())
//!     .column("username", "VARCHAR(50)")
//!     .build()?;
//!
//! let sb = StatementBuilder::new(Dialect::Generic);
//!
//! let create = sb.create_table(&users);
//! assert_eq!(
//!     create.sql(),
//!     "CREATE TABLE user_table (user_id INT AUTOINCREMENT PRIMARY KEY, username VARCHAR(50))"
//! );
//!
//! let update = sb.update(
//!     &users,
//!     [("username", "bob")],
//!     Some(&Predicate::eq("user_id", 1)),
//! )?;
//! assert_eq!(update.sql(), "UPDATE user_table SET username = ? WHERE user_id = ?");
//! # Ok::<(), sqlcraft::CraftError>(())
//! ```
//!
//! Running statements against PostgreSQL:
//!
//! ```ignore
//! use sqlcraft::{Credentials, DatabaseConfig, PgDatabase, Predicate};
//!
//! let db = PgDatabase::connect(DatabaseConfig::new(Credentials::from_env()?)).await?;
//! db.create_table(&users).await?;
//! let rows = db.select(&users, ["*"], Some(&Predicate::between("user_id", 1, 100))).await?;
//! db.close().await?;
//! ```

pub mod client;
pub mod config;
pub mod database;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod predicate;
pub mod prelude;
pub mod schema;
pub mod statement;
pub mod value;

pub use client::{Connection, PgConnection};
pub use config::{Credentials, DatabaseConfig};
pub use database::{Database, PgDatabase, ResultSet};
pub use dialect::Dialect;
pub use error::{CraftError, CraftResult, ExecutionError, QueryError, SchemaError};
pub use ident::Ident;
pub use predicate::{CompareOp, Predicate, escape_like};
pub use schema::{
    ColumnOptions, ColumnSpec, ForeignKey, ReferentialAction, TableSchema, TableSchemaBuilder,
};
pub use statement::{
    Aggregate, Order, Projection, SelectItem, SelectQuery, Statement, StatementBuilder,
    StatementKind,
};
pub use value::SqlValue;
