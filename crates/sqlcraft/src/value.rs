//! Literal values bound to statements.
//!
//! [`SqlValue`] is a closed set of the literal types this crate binds. Values
//! only ever reach the server as bound parameters; the single exception is a
//! column `DEFAULT` in `CREATE TABLE`, which is rendered through
//! [`SqlValue::to_sql_literal`] with quotes escaped.

use crate::dialect::Dialect;
use bytes::BytesMut;
use chrono::NaiveDateTime;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Format used for timestamp literals.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A literal value used as a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Short name of the variant, used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    /// Render as an inline SQL literal for `dialect`.
    ///
    /// Single quotes are doubled everywhere. MySQL also treats backslash as
    /// an escape inside string literals, so it is doubled there too.
    ///
    /// Only DDL uses this. Everything else binds values as parameters.
    pub fn to_sql_literal(&self, dialect: Dialect) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) if f.is_finite() => f.to_string(),
            SqlValue::Float(f) => quote_literal(&f.to_string(), dialect),
            SqlValue::Text(s) => quote_literal(s, dialect),
            SqlValue::Timestamp(ts) => {
                quote_literal(&ts.format(TIMESTAMP_FORMAT).to_string(), dialect)
            }
        }
    }
}

fn quote_literal(s: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if dialect == Dialect::MySql => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider unsigned types only convert when they fit in `i64`.
impl TryFrom<u64> for SqlValue {
    type Error = std::num::TryFromIntError;

    fn try_from(v: u64) -> Result<Self, Self::Error> {
        i64::try_from(v).map(SqlValue::Int)
    }
}

impl TryFrom<usize> for SqlValue {
    type Error = std::num::TryFromIntError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        i64::try_from(v).map(SqlValue::Int)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Build a `Vec<SqlValue>` from values of mixed types.
///
/// ```
/// use sqlcraft::{values, SqlValue};
///
/// let row = values![1, "alice", None::<i64>];
/// assert_eq!(row, vec![SqlValue::Int(1), SqlValue::from("alice"), SqlValue::Null]);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::SqlValue::from($value)),+]
    };
}

// tokio-postgres binding. Integers and floats are narrowed to the width the
// server asks for; every other pairing goes through the inner type's checked
// encoder so mismatches surface as driver errors instead of corrupt bytes.
impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => b.to_sql_checked(ty, out),
            SqlValue::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql_checked(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql_checked(ty, out),
                _ => n.to_sql_checked(ty, out),
            },
            SqlValue::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            SqlValue::Text(s) => s.as_str().to_sql_checked(ty, out),
            SqlValue::Timestamp(ts) => ts.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}
