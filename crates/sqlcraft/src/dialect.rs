//! SQL dialect differences that affect rendering.
//!
//! Supported servers differ in how bound parameters are written, how an
//! autoincrement column is declared and how identifiers and string literals
//! are quoted.

use std::fmt;
use std::fmt::Write as _;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// ANSI-style `?` placeholders and `AUTOINCREMENT`.
    #[default]
    Generic,
    /// `?` placeholders and `AUTO_INCREMENT`.
    MySql,
    /// Numbered `$n` placeholders and identity columns.
    Postgres,
}

impl Dialect {
    /// Returns the name of the dialect.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }

    /// Keyword(s) appended to an autoincrement column definition.
    pub fn autoincrement_keyword(self) -> &'static str {
        match self {
            Dialect::Generic => "AUTOINCREMENT",
            Dialect::MySql => "AUTO_INCREMENT",
            Dialect::Postgres => "GENERATED BY DEFAULT AS IDENTITY",
        }
    }

    /// Character that delimits a quoted identifier.
    pub fn identifier_quote(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Postgres => '"',
        }
    }

    /// ` ESCAPE '\'` as a string literal this dialect parses back to one backslash.
    pub fn like_escape_clause(self) -> &'static str {
        match self {
            Dialect::MySql => r" ESCAPE '\\'",
            Dialect::Generic | Dialect::Postgres => r" ESCAPE '\'",
        }
    }

    /// Whether placeholders carry their 1-based parameter index.
    pub fn numbered_placeholders(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Append the placeholder for the `index`-th (1-based) parameter.
    pub(crate) fn write_placeholder(self, out: &mut String, index: usize) {
        if self.numbered_placeholders() {
            // Writing to a String cannot fail.
            let _ = write!(out, "${index}");
        } else {
            out.push('?');
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
