use super::column::{ColumnOptions, ColumnSpec};
use crate::dialect::Dialect;
use crate::error::{QueryError, SchemaError};
use crate::ident::Ident;
use std::collections::HashMap;

/// `ON DELETE` / `ON UPDATE` behaviour of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
    SetDefault,
}

impl ReferentialAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// A table-level `FOREIGN KEY` declaration.
///
/// Names are checked when the owning table is built.
///
/// # Example
/// ```
/// use sqlcraft::{ForeignKey, ReferentialAction};
///
/// let fk = ForeignKey::new(&["author_id"], "users", &["id"])
///     .named("fk_posts_author")
///     .on_delete(ReferentialAction::Cascade);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    name: Option<String>,
    columns: Vec<String>,
    references: String,
    references_columns: Vec<String>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    pub fn new(columns: &[&str], references: &str, references_columns: &[&str]) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            references: references.to_string(),
            references_columns: references_columns.iter().map(|c| c.to_string()).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Emit `CONSTRAINT <name>` before the key.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// A foreign key whose names have been validated against its table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedForeignKey {
    name: Option<Ident>,
    columns: Vec<usize>,
    references: Ident,
    references_columns: Vec<Ident>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

/// Declarative description of a table.
///
/// Construction validates the whole definition; afterwards the schema is
/// immutable. Column order is declaration order and is the order every
/// statement builder uses.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: Ident,
    columns: Vec<ColumnSpec>,
    if_not_exists: bool,
    unique_keys: Vec<Vec<usize>>,
    foreign_keys: Vec<ResolvedForeignKey>,
    index: HashMap<String, usize>,
}

impl TableSchema {
    /// Build a schema from already-declared columns.
    pub fn new(name: &str, columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let mut builder = Self::builder(name);
        for column in columns {
            builder = builder.add(column);
        }
        builder.build()
    }

    /// Start a [`TableSchemaBuilder`].
    pub fn builder(name: &str) -> TableSchemaBuilder {
        TableSchemaBuilder::new(name)
    }

    pub fn ident(&self) -> &Ident {
        &self.name
    }

    /// The table name as it renders in SQL.
    pub fn name(&self) -> String {
        self.name.to_sql()
    }

    pub fn if_not_exists(&self) -> bool {
        self.if_not_exists
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(ColumnSpec::name).collect()
    }

    /// Look up a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Declaration index of a column, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let ident = Ident::column(name).ok()?;
        self.index.get(&ident.key()).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn primary_key(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.is_primary_key())
    }

    pub fn autoincrement_column(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.is_autoincrement())
    }

    /// Resolve a caller-supplied column name for a statement.
    pub(crate) fn resolve(&self, name: &str) -> Result<usize, QueryError> {
        self.column_index(name)
            .ok_or_else(|| QueryError::unknown_column(self.name(), name))
    }

    /// Resolve `name` and append the declared spelling of the column.
    pub(crate) fn write_column(
        &self,
        name: &str,
        dialect: Dialect,
        out: &mut String,
    ) -> Result<(), QueryError> {
        let idx = self.resolve(name)?;
        self.columns[idx].ident().write_sql(dialect, out);
        Ok(())
    }

    /// Append table-level constraints (`UNIQUE`, `FOREIGN KEY`) to a column list.
    pub(crate) fn write_table_constraints(&self, dialect: Dialect, out: &mut String) {
        for key in &self.unique_keys {
            out.push_str(", UNIQUE (");
            self.write_column_list(key, dialect, out);
            out.push(')');
        }
        for fk in &self.foreign_keys {
            out.push_str(", ");
            if let Some(name) = &fk.name {
                out.push_str("CONSTRAINT ");
                name.write_sql(dialect, out);
                out.push(' ');
            }
            out.push_str("FOREIGN KEY (");
            self.write_column_list(&fk.columns, dialect, out);
            out.push_str(") REFERENCES ");
            fk.references.write_sql(dialect, out);
            out.push_str(" (");
            for (i, col) in fk.references_columns.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                col.write_sql(dialect, out);
            }
            out.push(')');
            if let Some(action) = fk.on_delete {
                out.push_str(" ON DELETE ");
                out.push_str(action.as_sql());
            }
            if let Some(action) = fk.on_update {
                out.push_str(" ON UPDATE ");
                out.push_str(action.as_sql());
            }
        }
    }

    pub(crate) fn write_column_list(&self, indices: &[usize], dialect: Dialect, out: &mut String) {
        for (i, &idx) in indices.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.columns[idx].ident().write_sql(dialect, out);
        }
    }

    pub(crate) fn write_column_definitions(&self, dialect: Dialect, out: &mut String) {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            column.write_definition(dialect, out);
        }
    }
}

/// Incremental builder for [`TableSchema`].
///
/// The first error is remembered and reported by [`build`](Self::build), so
/// calls can be chained without intermediate `?`.
///
/// # Example
/// ```
/// use sqlcraft::{ColumnOptions, TableSchema};
///
/// let users = TableSchema::builder("user_table")
///     .if_not_exists()
///     .column_with("user_id", "INT", ColumnOptions::new().primary_key().autoincrement())
///     .column("username", "VARCHAR(50)")
///     .build()?;
///
/// assert_eq!(users.column_names(), vec!["user_id", "username"]);
/// # Ok::<(), sqlcraft::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
    if_not_exists: bool,
    unique_keys: Vec<Vec<String>>,
    foreign_keys: Vec<ForeignKey>,
    build_error: Option<SchemaError>,
}

impl TableSchemaBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            if_not_exists: false,
            unique_keys: Vec::new(),
            foreign_keys: Vec::new(),
            build_error: None,
        }
    }

    /// Render `CREATE TABLE IF NOT EXISTS`.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Declare a column with no options.
    pub fn column(self, name: &str, sql_type: &str) -> Self {
        self.column_with(name, sql_type, ColumnOptions::default())
    }

    /// Declare a column with options.
    pub fn column_with(mut self, name: &str, sql_type: &str, options: ColumnOptions) -> Self {
        match ColumnSpec::with_options(name, sql_type, options) {
            Ok(column) => self.columns.push(column),
            Err(e) => self.fail(e),
        }
        self
    }

    /// Add an already-declared column.
    pub fn add(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a table-level `UNIQUE (..)` key.
    pub fn unique(mut self, columns: &[&str]) -> Self {
        self.unique_keys
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    fn fail(&mut self, err: SchemaError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<TableSchema, SchemaError> {
        if let Some(err) = self.build_error {
            return Err(err);
        }

        let name = Ident::parse(&self.name)?;
        let table = name.to_sql();

        if self.columns.is_empty() {
            return Err(SchemaError::EmptyTable(table));
        }

        let mut index = HashMap::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            if index.insert(column.ident().key(), i).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    table,
                    column: column.name(),
                });
            }
        }

        let auto: Vec<&ColumnSpec> = self.columns.iter().filter(|c| c.is_autoincrement()).collect();
        if auto.len() > 1 {
            return Err(SchemaError::InvalidAutoincrement {
                table,
                reason: format!("{} autoincrement columns, at most one allowed", auto.len()),
            });
        }
        if let Some(column) = auto.first() {
            if !column.is_primary_key() {
                return Err(SchemaError::InvalidAutoincrement {
                    table,
                    reason: format!("column '{}' is not a primary key", column.name()),
                });
            }
        }

        let lookup = |column: &str| -> Result<usize, SchemaError> {
            Ident::column(column)
                .ok()
                .and_then(|ident| index.get(&ident.key()).copied())
                .ok_or_else(|| SchemaError::UnknownColumn {
                    table: table.clone(),
                    column: column.to_string(),
                })
        };

        let mut unique_keys = Vec::with_capacity(self.unique_keys.len());
        for key in &self.unique_keys {
            if key.is_empty() {
                return Err(SchemaError::identifier(&table, "UNIQUE key needs at least one column"));
            }
            unique_keys.push(key.iter().map(|c| lookup(c.as_str())).collect::<Result<Vec<_>, _>>()?);
        }

        let mut foreign_keys = Vec::with_capacity(self.foreign_keys.len());
        for fk in self.foreign_keys {
            if fk.columns.is_empty() || fk.columns.len() != fk.references_columns.len() {
                return Err(SchemaError::identifier(
                    &fk.references,
                    "foreign key needs matching, non-empty column lists",
                ));
            }
            foreign_keys.push(ResolvedForeignKey {
                name: fk.name.as_deref().map(Ident::column).transpose()?,
                columns: fk.columns.iter().map(|c| lookup(c.as_str())).collect::<Result<_, _>>()?,
                references: Ident::parse(&fk.references)?,
                references_columns: fk
                    .references_columns
                    .iter()
                    .map(|c| Ident::column(c.as_str()))
                    .collect::<Result<_, _>>()?,
                on_delete: fk.on_delete,
                on_update: fk.on_update,
            });
        }

        Ok(TableSchema {
            name,
            columns: self.columns,
            if_not_exists: self.if_not_exists,
            unique_keys,
            foreign_keys,
            index,
        })
    }
}
