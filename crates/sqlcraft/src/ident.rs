//! Validated table and column names.
//!
//! Table and column names are the only caller-supplied text that ever reaches
//! rendered SQL, so every one of them passes through [`Ident`] first.
//!
//! - Bare parts match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts may hold anything but NUL; `""` inside quotes is a literal `"`
//! - Table names may be qualified (`schema.table`); column names may not

use crate::dialect::Dialect;
use crate::error::SchemaError;
use std::fmt;
use std::str::FromStr;

/// One dot-separated segment of an [`Ident`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentPart {
    /// Written as-is.
    Unquoted(String),
    /// Written between the dialect's identifier quotes.
    Quoted(String),
}

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse a possibly qualified, possibly quoted name such as
    /// `orders`, `shop.orders` or `shop."Order Lines"`.
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        if s.is_empty() {
            return Err(SchemaError::identifier(s, "identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SchemaError::identifier(s, "identifier cannot contain NUL"));
        }

        let mut parts = Vec::new();
        let mut rest = s;
        loop {
            let (part, tail) = match rest.strip_prefix('"') {
                Some(body) => quoted_part(s, body)?,
                None => bare_part(s, rest)?,
            };
            parts.push(part);

            match tail.strip_prefix('.') {
                Some("") => return Err(SchemaError::identifier(s, "trailing '.'")),
                Some(next) => rest = next,
                None if tail.is_empty() => break,
                None => {
                    return Err(SchemaError::identifier(
                        s,
                        format!("unexpected {tail:?} after identifier part"),
                    ));
                }
            }
        }
        Ok(Self { parts })
    }

    /// Parse a column name, which must be a single part.
    pub fn column(s: &str) -> Result<Self, SchemaError> {
        let ident = Self::parse(s)?;
        if ident.parts.len() > 1 {
            return Err(SchemaError::identifier(s, "column names cannot be qualified"));
        }
        Ok(ident)
    }

    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Lookup key: lowercased parts joined by `.`.
    pub(crate) fn key(&self) -> String {
        let mut key = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                key.push('.');
            }
            let (IdentPart::Unquoted(name) | IdentPart::Quoted(name)) = part;
            key.push_str(&name.to_lowercase());
        }
        key
    }

    /// ANSI spelling, with quoted parts in double quotes.
    pub fn to_sql(&self) -> String {
        self.to_sql_for(Dialect::Generic)
    }

    /// Spelling for `dialect`; quoted parts use its quote character.
    pub fn to_sql_for(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_sql(dialect, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, dialect: Dialect, out: &mut String) {
        let quote = dialect.identifier_quote();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(name) => out.push_str(name),
                IdentPart::Quoted(name) => {
                    out.push(quote);
                    for ch in name.chars() {
                        if ch == quote {
                            out.push(quote);
                        }
                        out.push(ch);
                    }
                    out.push(quote);
                }
            }
        }
    }
}

/// `body` starts just after an opening quote. Returns the part and what
/// follows the closing quote.
fn quoted_part<'a>(whole: &str, body: &'a str) -> Result<(IdentPart, &'a str), SchemaError> {
    let mut name = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        let after = &body[i + 1..];
        if after.starts_with('"') {
            chars.next();
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(SchemaError::identifier(whole, "empty quoted identifier"));
        }
        return Ok((IdentPart::Quoted(name), after));
    }
    Err(SchemaError::identifier(whole, "unclosed quoted identifier"))
}

/// Bare segment up to the next `.`.
fn bare_part<'a>(whole: &str, text: &'a str) -> Result<(IdentPart, &'a str), SchemaError> {
    let end = text.find('.').unwrap_or(text.len());
    let (name, tail) = text.split_at(end);

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(SchemaError::identifier(whole, "empty identifier segment")),
        Some(c) if !(c == '_' || c.is_ascii_alphabetic()) => {
            return Err(SchemaError::identifier(
                whole,
                format!("cannot start with '{c}'"),
            ));
        }
        Some(_) => {}
    }
    if let Some(c) = chars.find(|&c| !(c == '_' || c == '$' || c.is_ascii_alphanumeric())) {
        return Err(SchemaError::identifier(
            whole,
            format!("invalid character '{c}'"),
        ));
    }
    Ok((IdentPart::Unquoted(name.to_string()), tail))
}

impl FromStr for Ident {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_qualified_names() {
        assert_eq!(Ident::parse("user_table").unwrap().to_sql(), "user_table");
        assert_eq!(Ident::parse("shop.orders").unwrap().to_sql(), "shop.orders");
        assert_eq!(Ident::parse("price$usd").unwrap().to_sql(), "price$usd");
    }

    #[test]
    fn quoted_names_round_trip_escapes() {
        let ident = Ident::parse(r#"shop."Order ""Lines""""#).unwrap();
        assert_eq!(
            ident.parts()[1],
            IdentPart::Quoted(r#"Order "Lines""#.to_string())
        );
        assert_eq!(ident.to_sql(), r#"shop."Order ""Lines""""#);
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        let ident = Ident::parse(r#"shop."Order `Id`""#).unwrap();
        assert_eq!(ident.to_sql_for(Dialect::MySql), "shop.`Order ``Id```");
        assert_eq!(ident.to_sql_for(Dialect::Postgres), r#"shop."Order `Id`""#);
        assert_eq!(Ident::parse("orders").unwrap().to_sql_for(Dialect::MySql), "orders");
    }

    #[test]
    fn key_is_case_insensitive() {
        let a = Ident::parse("UserName").unwrap();
        let b = Ident::parse("username").unwrap();
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
    }

    #[test]
    fn columns_are_single_part() {
        assert!(Ident::column("orders.id").is_err());
        assert!(Ident::column(r#""Order Id""#).is_ok());
    }

    #[test]
    fn rejects_sql_fragments() {
        for bad in [
            "id; DROP TABLE users",
            "id--",
            "a'b",
            "name = name OR 1=1",
            "col)",
        ] {
            let err = Ident::parse(bad).unwrap_err();
            assert!(matches!(err, SchemaError::InvalidIdentifier { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "1table", "shop..orders", "shop.", r#""open"#, r#""""#, r#""a"b"#, "a\0b"] {
            assert!(Ident::parse(bad).is_err(), "{bad:?}");
        }
    }
}
