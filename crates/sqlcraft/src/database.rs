//! Execution facade: one [`Connection`] plus statement building and logging.

use crate::client::{Connection, PgConnection};
use crate::config::DatabaseConfig;
use crate::error::{CraftResult, ExecutionError, QueryError};
use crate::predicate::Predicate;
use crate::schema::TableSchema;
use crate::statement::{Projection, SelectQuery, Statement, StatementBuilder};
use crate::value::SqlValue;
use std::borrow::Cow;

/// [`Database`] over tokio-postgres.
pub type PgDatabase = Database<PgConnection>;

/// Rows returned by [`Database::execute`], in the order the server sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<R> {
    rows: Vec<R>,
}

impl<R> ResultSet<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn first(&self) -> Option<&R> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R> Default for ResultSet<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> IntoIterator for ResultSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Owns one connection and runs [`Statement`]s on it.
///
/// Statements must be built for the connection's dialect; use
/// [`statements`](Self::statements) or the convenience methods, which do that
/// for you.
///
/// A `Database` is not a pool. Share it behind your own synchronization or
/// open one per unit of work.
///
/// # Logging
///
/// Events go to the `sqlcraft.sql` tracing target:
/// - `debug` before each statement (kind, parameter count, truncated SQL),
///   unless disabled with [`DatabaseConfig::log_statements`]
/// - `warn` before an UPDATE or DELETE without a WHERE clause
/// - `error` when the driver reports a failure
pub struct Database<C: Connection> {
    conn: C,
    config: DatabaseConfig,
    builder: StatementBuilder,
}

impl<C: Connection> Database<C> {
    /// Open a connection with `config.credentials`.
    pub async fn connect(config: DatabaseConfig) -> CraftResult<Self> {
        let conn = C::connect(&config.credentials).await.map_err(|e| {
            tracing::error!(
                target: "sqlcraft.sql",
                host = %config.credentials.host,
                database = %config.credentials.database,
                error = %e,
                "connect failed"
            );
            ExecutionError::Connection(e.to_string())
        })?;
        Ok(Self::new(config, conn))
    }

    /// Wrap an already open connection.
    pub fn new(config: DatabaseConfig, conn: C) -> Self {
        let builder = StatementBuilder::new(conn.dialect());
        Self {
            conn,
            config,
            builder,
        }
    }

    /// Builder for this connection's dialect.
    pub fn statements(&self) -> StatementBuilder {
        self.builder
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Run a statement and collect its rows.
    ///
    /// Fails with [`QueryError::DialectMismatch`] before touching the
    /// connection if `statement` was built for another dialect. Driver errors
    /// come back as [`ExecutionError::DriverFailure`] with the cause attached.
    pub async fn execute(&self, statement: &Statement) -> CraftResult<ResultSet<C::Row>> {
        let expected = self.builder.dialect();
        if statement.dialect() != expected {
            return Err(QueryError::DialectMismatch {
                expected,
                found: statement.dialect(),
            }
            .into());
        }

        let sql = self.display_sql(statement.sql());
        if self.config.log_statements {
            tracing::debug!(
                target: "sqlcraft.sql",
                kind = %statement.kind(),
                param_count = statement.params().len(),
                sql = %sql,
                "executing statement"
            );
        }
        if statement.is_unguarded_write() {
            tracing::warn!(
                target: "sqlcraft.sql",
                kind = %statement.kind(),
                sql = %sql,
                "statement has no WHERE clause and applies to every row"
            );
        }

        match self.conn.execute(statement.sql(), statement.params()).await {
            Ok(rows) => Ok(ResultSet::new(rows)),
            Err(e) => {
                tracing::error!(
                    target: "sqlcraft.sql",
                    kind = %statement.kind(),
                    sql = %sql,
                    error = %e,
                    "statement failed"
                );
                Err(ExecutionError::driver(e).into())
            }
        }
    }

    pub async fn create_table(&self, schema: &TableSchema) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.create_table(schema);
        self.execute(&stmt).await
    }

    pub async fn drop_table(
        &self,
        schema: &TableSchema,
        if_exists: bool,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.drop_table(schema, if_exists);
        self.execute(&stmt).await
    }

    pub async fn insert<S: AsRef<str>>(
        &self,
        schema: &TableSchema,
        columns: &[S],
        values: Vec<SqlValue>,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.insert(schema, columns, values)?;
        self.execute(&stmt).await
    }

    pub async fn insert_many<S: AsRef<str>>(
        &self,
        schema: &TableSchema,
        columns: &[S],
        rows: Vec<Vec<SqlValue>>,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.insert_many(schema, columns, rows)?;
        self.execute(&stmt).await
    }

    pub async fn select(
        &self,
        schema: &TableSchema,
        projection: impl Into<Projection>,
        predicate: Option<&Predicate>,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.select(schema, projection, predicate)?;
        self.execute(&stmt).await
    }

    pub async fn select_query(
        &self,
        schema: &TableSchema,
        query: &SelectQuery,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.select_query(schema, query)?;
        self.execute(&stmt).await
    }

    pub async fn update<K, V>(
        &self,
        schema: &TableSchema,
        assignments: impl IntoIterator<Item = (K, V)>,
        predicate: Option<&Predicate>,
    ) -> CraftResult<ResultSet<C::Row>>
    where
        K: AsRef<str>,
        V: Into<SqlValue>,
    {
        let stmt = self.builder.update(schema, assignments, predicate)?;
        self.execute(&stmt).await
    }

    pub async fn delete(
        &self,
        schema: &TableSchema,
        predicate: Option<&Predicate>,
    ) -> CraftResult<ResultSet<C::Row>> {
        let stmt = self.builder.delete(schema, predicate)?;
        self.execute(&stmt).await
    }

    /// Close the underlying connection.
    pub async fn close(self) -> CraftResult<()> {
        self.conn.close().await.map_err(ExecutionError::driver)?;
        Ok(())
    }

    fn display_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => Cow::Owned(format!("{}...", truncate_sql_bytes(sql, max))),
            _ => Cow::Borrowed(sql),
        }
    }
}

impl<C: Connection + std::fmt::Debug> std::fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.builder.dialect())
            .field("conn", &self.conn)
            .field("config", &self.config)
            .finish()
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
