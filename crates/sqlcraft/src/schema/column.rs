use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::ident::Ident;
use crate::value::SqlValue;
use regex::Regex;
use std::sync::LazyLock;

/// A declared type must start with a type word, e.g. `INT`, `VARCHAR(50)`,
/// `DOUBLE PRECISION`, `ENUM('a','b')`.
static TYPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*").expect("static regex"));

/// Options recognised on a column definition.
///
/// # Example
/// ```
/// use sqlcraft::ColumnOptions;
///
/// let opts = ColumnOptions::new().primary_key().autoincrement();
/// assert!(opts.autoincrement);
/// assert_eq!(opts.constraint.as_deref(), Some("PRIMARY KEY"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    /// Server generates the value (`AUTOINCREMENT` and friends).
    pub autoincrement: bool,
    /// Column constraint keywords: `PRIMARY KEY`, `NOT NULL`, `NULL`, `UNIQUE`.
    pub constraint: Option<String>,
    /// `DEFAULT` literal.
    pub default: Option<SqlValue>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Replace the constraint text.
    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn primary_key(self) -> Self {
        self.push_constraint("PRIMARY KEY")
    }

    pub fn not_null(self) -> Self {
        self.push_constraint("NOT NULL")
    }

    pub fn unique(self) -> Self {
        self.push_constraint("UNIQUE")
    }

    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn push_constraint(mut self, keyword: &str) -> Self {
        self.constraint = Some(match self.constraint.take() {
            Some(existing) => format!("{existing} {keyword}"),
            None => keyword.to_string(),
        });
        self
    }
}

/// One column of a [`TableSchema`](crate::TableSchema).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    name: Ident,
    sql_type: String,
    autoincrement: bool,
    constraint: Option<String>,
    default: Option<SqlValue>,
}

impl ColumnSpec {
    /// Declare a column with no options.
    pub fn new(name: &str, sql_type: &str) -> Result<Self, SchemaError> {
        Self::with_options(name, sql_type, ColumnOptions::default())
    }

    /// Declare a column.
    ///
    /// Fails with [`SchemaError::InvalidColumnType`] when `sql_type` is blank or
    /// does not begin with a type word, and with
    /// [`SchemaError::InvalidConstraint`] when the constraint holds anything
    /// other than the recognised keywords.
    pub fn with_options(
        name: &str,
        sql_type: &str,
        options: ColumnOptions,
    ) -> Result<Self, SchemaError> {
        let ident = Ident::column(name)?;

        let sql_type = sql_type.trim();
        if sql_type.is_empty()
            || !TYPE_TOKEN.is_match(sql_type)
            || [";", "--", "/*"].iter().any(|t| sql_type.contains(t))
        {
            return Err(SchemaError::InvalidColumnType {
                column: name.to_string(),
                sql_type: sql_type.to_string(),
            });
        }

        let constraint = options
            .constraint
            .as_deref()
            .map(|c| normalize_constraint(name, c))
            .transpose()?;

        Ok(Self {
            name: ident,
            sql_type: sql_type.to_string(),
            autoincrement: options.autoincrement,
            constraint,
            default: options.default,
        })
    }

    pub fn ident(&self) -> &Ident {
        &self.name
    }

    /// The column name as it renders in SQL.
    pub fn name(&self) -> String {
        self.name.to_sql()
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }

    /// Normalised constraint keywords, upper-case and single-spaced.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    pub fn default_value(&self) -> Option<&SqlValue> {
        self.default.as_ref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraint
            .as_deref()
            .is_some_and(|c| c.contains("PRIMARY KEY"))
    }

    /// `<name> <type> [AUTOINCREMENT] [<constraint>] [DEFAULT <literal>]`
    pub(crate) fn write_definition(&self, dialect: Dialect, out: &mut String) {
        self.name.write_sql(dialect, out);
        out.push(' ');
        out.push_str(&self.sql_type);
        if self.autoincrement {
            out.push(' ');
            out.push_str(dialect.autoincrement_keyword());
        }
        if let Some(constraint) = &self.constraint {
            out.push(' ');
            out.push_str(constraint);
        }
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(&default.to_sql_literal(dialect));
        }
    }
}

fn normalize_constraint(column: &str, raw: &str) -> Result<String, SchemaError> {
    let invalid = || SchemaError::InvalidConstraint {
        column: column.to_string(),
        constraint: raw.to_string(),
    };

    let words: Vec<String> = raw.split_whitespace().map(str::to_ascii_uppercase).collect();
    if words.is_empty() {
        return Err(invalid());
    }

    let mut keywords = Vec::new();
    let mut iter = words.iter().map(String::as_str);
    while let Some(word) = iter.next() {
        let keyword = match word {
            "PRIMARY" => match iter.next() {
                Some("KEY") => "PRIMARY KEY",
                _ => return Err(invalid()),
            },
            "NOT" => match iter.next() {
                Some("NULL") => "NOT NULL",
                _ => return Err(invalid()),
            },
            "NULL" => "NULL",
            "UNIQUE" => "UNIQUE",
            _ => return Err(invalid()),
        };
        keywords.push(keyword);
    }
    Ok(keywords.join(" "))
}
