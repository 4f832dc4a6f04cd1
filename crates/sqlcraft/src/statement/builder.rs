use super::select::{Aggregate, Projection, SelectItem, SelectQuery};
use super::{Statement, StatementKind};
use crate::dialect::Dialect;
use crate::error::{QueryError, SchemaError};
use crate::ident::Ident;
use crate::predicate::Predicate;
use crate::schema::TableSchema;
use crate::value::SqlValue;
use std::fmt::Write as _;

/// Renders parameterized statements for one [`Dialect`].
///
/// Identifiers come only from validated [`TableSchema`] columns and values are
/// always bound, so caller-supplied text never reaches the SQL string.
///
/// # Example
/// ```
/// use sqlcraft::{values, Dialect, Predicate, StatementBuilder, TableSchema};
///
/// let users = TableSchema::builder("user_table")
///     .column("user_id", "INT")
///     .column("username", "VARCHAR(50)")
///     .build()?;
///
/// let sb = StatementBuilder::new(Dialect::Generic);
/// let insert = sb.insert(&users, &["user_id", "username"], values![1, "alice"])?;
/// assert_eq!(insert.sql(), "INSERT INTO user_table (user_id, username) VALUES (?, ?)");
///
/// let select = sb.select(&users, ["*"], Some(&Predicate::between("user_id", 1, 100)))?;
/// assert_eq!(select.sql(), "SELECT * FROM user_table WHERE user_id BETWEEN ? AND ?");
/// # Ok::<(), sqlcraft::CraftError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatementBuilder {
    dialect: Dialect,
}

impl StatementBuilder {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// `CREATE TABLE [IF NOT EXISTS] name (defs..)`. Binds no parameters.
    pub fn create_table(&self, schema: &TableSchema) -> Statement {
        let mut sql = String::from("CREATE TABLE ");
        if schema.if_not_exists() {
            sql.push_str("IF NOT EXISTS ");
        }
        schema.ident().write_sql(self.dialect, &mut sql);
        sql.push_str(" (");
        schema.write_column_definitions(self.dialect, &mut sql);
        schema.write_table_constraints(self.dialect, &mut sql);
        sql.push(')');
        self.finish(sql, Vec::new(), StatementKind::CreateTable, true)
    }

    /// `DROP TABLE [IF EXISTS] name`.
    pub fn drop_table(&self, schema: &TableSchema, if_exists: bool) -> Statement {
        let mut sql = String::from("DROP TABLE ");
        if if_exists {
            sql.push_str("IF EXISTS ");
        }
        schema.ident().write_sql(self.dialect, &mut sql);
        self.finish(sql, Vec::new(), StatementKind::DropTable, true)
    }

    /// Single-row INSERT into the named columns.
    pub fn insert<S: AsRef<str>>(
        &self,
        schema: &TableSchema,
        columns: &[S],
        values: Vec<SqlValue>,
    ) -> Result<Statement, QueryError> {
        self.insert_many(schema, columns, vec![values])
    }

    /// Single-row INSERT supplying every declared column in order.
    pub fn insert_row(
        &self,
        schema: &TableSchema,
        values: Vec<SqlValue>,
    ) -> Result<Statement, QueryError> {
        let columns = schema.column_names();
        self.insert_many(schema, &columns, vec![values])
    }

    /// Multi-row INSERT; every row must match `columns` in length.
    pub fn insert_many<S: AsRef<str>>(
        &self,
        schema: &TableSchema,
        columns: &[S],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<Statement, QueryError> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(QueryError::ColumnValueMismatch {
                    columns: columns.len(),
                    values: row.len(),
                });
            }
        }
        if columns.is_empty() || rows.is_empty() {
            return Err(QueryError::EmptyInsert {
                table: schema.name(),
            });
        }
        let indices = columns
            .iter()
            .map(|c| schema.resolve(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, idx) in indices.iter().enumerate() {
            if indices[..i].contains(idx) {
                return Err(QueryError::DuplicateColumn {
                    table: schema.name(),
                    column: columns[i].as_ref().to_string(),
                });
            }
        }

        let mut sql = String::from("INSERT INTO ");
        schema.ident().write_sql(self.dialect, &mut sql);
        sql.push_str(" (");
        schema.write_column_list(&indices, self.dialect, &mut sql);
        sql.push_str(") VALUES ");

        let mut params = Vec::with_capacity(columns.len() * rows.len());
        for (r, row) in rows.into_iter().enumerate() {
            if r > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for (i, value) in row.into_iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                params.push(value);
                self.dialect.write_placeholder(&mut sql, params.len());
            }
            sql.push(')');
        }
        Ok(self.finish(sql, params, StatementKind::Insert, true))
    }

    /// `SELECT <projection> FROM name [WHERE ..]`.
    ///
    /// `None` selects every row of the table.
    pub fn select(
        &self,
        schema: &TableSchema,
        projection: impl Into<Projection>,
        predicate: Option<&Predicate>,
    ) -> Result<Statement, QueryError> {
        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();
        self.write_projection(schema, &projection.into(), &mut sql)?;
        sql.push_str(" FROM ");
        schema.ident().write_sql(self.dialect, &mut sql);
        let filtered = self.write_where(schema, predicate, &mut sql, &mut params)?;
        Ok(self.finish(sql, params, StatementKind::Select, filtered))
    }

    /// SELECT with aggregates, aliases, DISTINCT, GROUP BY, HAVING, ORDER BY
    /// and paging.
    ///
    /// HAVING parameters are numbered after the WHERE parameters.
    pub fn select_query(
        &self,
        schema: &TableSchema,
        query: &SelectQuery,
    ) -> Result<Statement, QueryError> {
        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();
        if query.distinct {
            sql.push_str("DISTINCT ");
        }
        self.write_projection(schema, &query.projection, &mut sql)?;
        sql.push_str(" FROM ");
        schema.ident().write_sql(self.dialect, &mut sql);
        let filtered = self.write_where(schema, query.predicate.as_ref(), &mut sql, &mut params)?;

        if !query.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            for (i, column) in query.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                schema.write_column(column, self.dialect, &mut sql)?;
            }
        }
        for (i, (aggregate, op, value)) in query.having.iter().enumerate() {
            sql.push_str(if i == 0 { " HAVING " } else { " AND " });
            self.write_aggregate(schema, aggregate, &mut sql)?;
            sql.push(' ');
            sql.push_str(op.as_sql());
            sql.push(' ');
            params.push(value.clone());
            self.dialect.write_placeholder(&mut sql, params.len());
        }
        if !query.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, (column, order)) in query.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                schema.write_column(column, self.dialect, &mut sql)?;
                sql.push(' ');
                sql.push_str(order.as_sql());
            }
        }
        if let Some(limit) = query.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = query.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }
        Ok(self.finish(sql, params, StatementKind::Select, filtered))
    }

    /// `UPDATE name SET col = ?, .. [WHERE ..]`.
    ///
    /// SET items follow declared column order whatever order the assignments
    /// arrive in. A column assigned twice keeps its last value. `None` updates
    /// every row of the table.
    pub fn update<K, V>(
        &self,
        schema: &TableSchema,
        assignments: impl IntoIterator<Item = (K, V)>,
        predicate: Option<&Predicate>,
    ) -> Result<Statement, QueryError>
    where
        K: AsRef<str>,
        V: Into<SqlValue>,
    {
        let mut slots: Vec<Option<SqlValue>> = vec![None; schema.columns().len()];
        for (column, value) in assignments {
            let idx = schema.resolve(column.as_ref())?;
            slots[idx] = Some(value.into());
        }
        if slots.iter().all(Option::is_none) {
            return Err(QueryError::EmptyUpdate {
                table: schema.name(),
            });
        }

        let mut sql = String::from("UPDATE ");
        schema.ident().write_sql(self.dialect, &mut sql);
        sql.push_str(" SET ");
        let mut params = Vec::new();
        for (idx, value) in slots.into_iter().enumerate() {
            let Some(value) = value else { continue };
            if !params.is_empty() {
                sql.push_str(", ");
            }
            schema.columns()[idx].ident().write_sql(self.dialect, &mut sql);
            sql.push_str(" = ");
            params.push(value);
            self.dialect.write_placeholder(&mut sql, params.len());
        }
        let filtered = self.write_where(schema, predicate, &mut sql, &mut params)?;
        Ok(self.finish(sql, params, StatementKind::Update, filtered))
    }

    /// `DELETE FROM name [WHERE ..]`. `None` deletes every row.
    pub fn delete(
        &self,
        schema: &TableSchema,
        predicate: Option<&Predicate>,
    ) -> Result<Statement, QueryError> {
        let mut sql = String::from("DELETE FROM ");
        schema.ident().write_sql(self.dialect, &mut sql);
        let mut params = Vec::new();
        let filtered = self.write_where(schema, predicate, &mut sql, &mut params)?;
        Ok(self.finish(sql, params, StatementKind::Delete, filtered))
    }

    fn write_projection(
        &self,
        schema: &TableSchema,
        projection: &Projection,
        sql: &mut String,
    ) -> Result<(), QueryError> {
        let items = match projection {
            Projection::All => {
                sql.push('*');
                return Ok(());
            }
            Projection::Items(items) if items.is_empty() => {
                return Err(QueryError::EmptyProjection {
                    table: schema.name(),
                });
            }
            Projection::Items(items) => items,
        };
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.write_select_item(schema, item, sql)?;
        }
        Ok(())
    }

    fn write_select_item(
        &self,
        schema: &TableSchema,
        item: &SelectItem,
        sql: &mut String,
    ) -> Result<(), QueryError> {
        match item {
            SelectItem::Column(column) => schema.write_column(column, self.dialect, sql),
            SelectItem::Aggregate(agg) => self.write_aggregate(schema, agg, sql),
            SelectItem::Aliased { item, alias } => {
                let ident = Ident::column(alias).map_err(|e| QueryError::InvalidAlias {
                    alias: alias.clone(),
                    reason: match e {
                        SchemaError::InvalidIdentifier { reason, .. } => reason,
                        other => other.to_string(),
                    },
                })?;
                self.write_select_item(schema, item, sql)?;
                sql.push_str(" AS ");
                ident.write_sql(self.dialect, sql);
                Ok(())
            }
        }
    }

    fn write_aggregate(
        &self,
        schema: &TableSchema,
        agg: &Aggregate,
        sql: &mut String,
    ) -> Result<(), QueryError> {
        sql.push_str(agg.function());
        sql.push('(');
        match agg.column() {
            Some(column) => schema.write_column(column, self.dialect, sql)?,
            None => sql.push('*'),
        }
        sql.push(')');
        Ok(())
    }

    /// Returns whether a WHERE clause was written.
    fn write_where(
        &self,
        schema: &TableSchema,
        predicate: Option<&Predicate>,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
    ) -> Result<bool, QueryError> {
        match predicate {
            Some(pred) => {
                sql.push_str(" WHERE ");
                pred.write(schema, self.dialect, sql, params)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn finish(
        &self,
        sql: String,
        params: Vec<SqlValue>,
        kind: StatementKind,
        filtered: bool,
    ) -> Statement {
        Statement::new(sql, params, kind, self.dialect, filtered)
    }
}
