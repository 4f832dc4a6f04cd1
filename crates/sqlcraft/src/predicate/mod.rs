//! Composable WHERE conditions.
//!
//! A [`Predicate`] is an immutable tree of comparisons joined by AND/OR/NOT.
//! Leaves hold [`SqlValue`] literals only, so rendering never has anything to
//! interpolate except validated column names and placeholders.
//!
//! # Example
//!
//! ```
//! use sqlcraft::{Dialect, Predicate, TableSchema};
//!
//! let users = TableSchema::builder("users")
//!     .column("id", "INT")
//!     .column("status", "TEXT")
//!     .column("age", "INT")
//!     .build()?;
//!
//! let pred = Predicate::eq("status", "active")
//!     .and(Predicate::gte("age", 18).or(Predicate::is_null("age")));
//!
//! let (sql, params) = pred.render(&users, Dialect::Generic)?;
//! assert_eq!(sql, "status = ? AND (age >= ? OR age IS NULL)");
//! assert_eq!(params.len(), 2);
//! # Ok::<(), sqlcraft::CraftError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::QueryError;
use crate::schema::TableSchema;
use crate::value::SqlValue;

/// Comparison operator of a [`Predicate::Comparison`] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal: column = value
    Eq,
    /// Not equal: column != value
    Ne,
    /// Less than: column < value
    Lt,
    /// Less than or equal: column <= value
    Lte,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Boolean condition tree rendered into a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> ?`
    Comparison {
        column: String,
        op: CompareOp,
        value: SqlValue,
    },
    /// `column BETWEEN ? AND ?`
    Between {
        column: String,
        low: SqlValue,
        high: SqlValue,
    },
    /// `column IN (?, ?, ...)`
    In { column: String, values: Vec<SqlValue> },
    /// `column LIKE ?`; `escaped` adds an ESCAPE clause naming `\` as the
    /// escape character.
    Like {
        column: String,
        pattern: String,
        escaped: bool,
    },
    /// `column IS NULL`
    IsNull { column: String },
    /// `column IS NOT NULL`
    IsNotNull { column: String },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Build a comparison leaf.
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Predicate::Comparison {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Create an equality condition: column = value
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// Create an inequality condition: column != value
    pub fn ne(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    /// Create a less-than condition: column < value
    pub fn lt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    /// Create a less-than-or-equal condition: column <= value
    pub fn lte(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Lte, value)
    }

    /// Create a greater-than condition: column > value
    pub fn gt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    /// Create a greater-than-or-equal condition: column >= value
    pub fn gte(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Gte, value)
    }

    /// Create a BETWEEN condition: column BETWEEN low AND high
    pub fn between(
        column: impl Into<String>,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> Self {
        Predicate::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// Create an IN condition: column IN (values...)
    ///
    /// An empty list is accepted here and rejected when rendered.
    pub fn in_list<V: Into<SqlValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a LIKE condition with a caller-written pattern (`%`, `_` are live).
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            column: column.into(),
            pattern: pattern.into(),
            escaped: false,
        }
    }

    /// LIKE with `\` declared as the escape character, for patterns built
    /// with [`escape_like`].
    pub fn like_escaped(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            column: column.into(),
            pattern: pattern.into(),
            escaped: true,
        }
    }

    /// `column LIKE 'prefix%'`, with wildcards in `prefix` escaped.
    pub fn starts_with(column: impl Into<String>, prefix: &str) -> Self {
        Self::like_escaped(column, format!("{}%", escape_like(prefix)))
    }

    /// `column LIKE '%suffix'`, with wildcards in `suffix` escaped.
    pub fn ends_with(column: impl Into<String>, suffix: &str) -> Self {
        Self::like_escaped(column, format!("%{}", escape_like(suffix)))
    }

    /// `column LIKE '%needle%'`, with wildcards in `needle` escaped.
    pub fn contains(column: impl Into<String>, needle: &str) -> Self {
        Self::like_escaped(column, format!("%{}%", escape_like(needle)))
    }

    /// Create an IS NULL condition: column IS NULL
    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull {
            column: column.into(),
        }
    }

    /// Create an IS NOT NULL condition: column IS NOT NULL
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Predicate::IsNotNull {
            column: column.into(),
        }
    }

    /// `self AND other`
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// `self OR other`
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// `NOT (self)`
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Left-fold the predicates with AND. `None` when the iterator is empty.
    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        preds.into_iter().reduce(Predicate::and)
    }

    /// Left-fold the predicates with OR. `None` when the iterator is empty.
    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        preds.into_iter().reduce(Predicate::or)
    }

    fn is_combinator(&self) -> bool {
        matches!(self, Predicate::And(..) | Predicate::Or(..))
    }

    /// Render to a SQL fragment and its parameters, numbering placeholders from 1.
    pub fn render(
        &self,
        schema: &TableSchema,
        dialect: Dialect,
    ) -> Result<(String, Vec<SqlValue>), QueryError> {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.write(schema, dialect, &mut sql, &mut params)?;
        Ok((sql, params))
    }

    /// Render into an existing statement, numbering placeholders after the
    /// parameters already in `params`.
    pub(crate) fn write(
        &self,
        schema: &TableSchema,
        dialect: Dialect,
        out: &mut String,
        params: &mut Vec<SqlValue>,
    ) -> Result<(), QueryError> {
        match self {
            Predicate::Comparison { column, op, value } => {
                schema.write_column(column, dialect, out)?;
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                bind(dialect, value.clone(), out, params);
            }
            Predicate::Between { column, low, high } => {
                schema.write_column(column, dialect, out)?;
                out.push_str(" BETWEEN ");
                bind(dialect, low.clone(), out, params);
                out.push_str(" AND ");
                bind(dialect, high.clone(), out, params);
            }
            Predicate::In { column, values } => {
                if values.is_empty() {
                    return Err(QueryError::EmptyInSet {
                        column: column.clone(),
                    });
                }
                schema.write_column(column, dialect, out)?;
                out.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    bind(dialect, value.clone(), out, params);
                }
                out.push(')');
            }
            Predicate::Like {
                column,
                pattern,
                escaped,
            } => {
                schema.write_column(column, dialect, out)?;
                out.push_str(" LIKE ");
                bind(dialect, SqlValue::Text(pattern.clone()), out, params);
                if *escaped {
                    out.push_str(dialect.like_escape_clause());
                }
            }
            Predicate::IsNull { column } => {
                schema.write_column(column, dialect, out)?;
                out.push_str(" IS NULL");
            }
            Predicate::IsNotNull { column } => {
                schema.write_column(column, dialect, out)?;
                out.push_str(" IS NOT NULL");
            }
            Predicate::And(left, right) => {
                write_side(left, schema, dialect, out, params)?;
                out.push_str(" AND ");
                write_side(right, schema, dialect, out, params)?;
            }
            Predicate::Or(left, right) => {
                write_side(left, schema, dialect, out, params)?;
                out.push_str(" OR ");
                write_side(right, schema, dialect, out, params)?;
            }
            Predicate::Not(inner) => {
                out.push_str("NOT (");
                inner.write(schema, dialect, out, params)?;
                out.push(')');
            }
        }
        Ok(())
    }
}

/// Operands of AND/OR are parenthesized when they are combinators themselves.
fn write_side(
    side: &Predicate,
    schema: &TableSchema,
    dialect: Dialect,
    out: &mut String,
    params: &mut Vec<SqlValue>,
) -> Result<(), QueryError> {
    if side.is_combinator() {
        out.push('(');
        side.write(schema, dialect, out, params)?;
        out.push(')');
        Ok(())
    } else {
        side.write(schema, dialect, out, params)
    }
}

fn bind(dialect: Dialect, value: SqlValue, out: &mut String, params: &mut Vec<SqlValue>) {
    params.push(value);
    dialect.write_placeholder(out, params.len());
}

/// Escape `\`, `%` and `_` so the text matches literally inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
