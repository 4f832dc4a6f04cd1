//! SELECT projections and clauses.

use crate::predicate::{CompareOp, Predicate};
use crate::value::SqlValue;

/// Aggregate function in a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// `COUNT(*)`
    CountAll,
    Count(String),
    Sum(String),
    Avg(String),
    Min(String),
    Max(String),
}

impl Aggregate {
    pub(crate) fn function(&self) -> &'static str {
        match self {
            Aggregate::CountAll | Aggregate::Count(_) => "COUNT",
            Aggregate::Sum(_) => "SUM",
            Aggregate::Avg(_) => "AVG",
            Aggregate::Min(_) => "MIN",
            Aggregate::Max(_) => "MAX",
        }
    }

    /// Column argument, `None` for `COUNT(*)`.
    pub(crate) fn column(&self) -> Option<&str> {
        match self {
            Aggregate::CountAll => None,
            Aggregate::Count(c)
            | Aggregate::Sum(c)
            | Aggregate::Avg(c)
            | Aggregate::Min(c)
            | Aggregate::Max(c) => Some(c),
        }
    }

    /// Project this aggregate under `alias`.
    pub fn alias(self, alias: impl Into<String>) -> SelectItem {
        SelectItem::Aggregate(self).alias(alias)
    }
}

/// One item of an explicit projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    Column(String),
    Aggregate(Aggregate),
    /// `<item> AS <alias>`. The alias must be a valid column identifier.
    Aliased { item: Box<SelectItem>, alias: String },
}

impl SelectItem {
    /// Rename the item in the result set. Aliasing twice keeps the last alias.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        let item = match self {
            SelectItem::Aliased { item, .. } => item,
            other => Box::new(other),
        };
        SelectItem::Aliased {
            item,
            alias: alias.into(),
        }
    }
}

impl From<&str> for SelectItem {
    fn from(column: &str) -> Self {
        SelectItem::Column(column.to_string())
    }
}

impl From<String> for SelectItem {
    fn from(column: String) -> Self {
        SelectItem::Column(column)
    }
}

impl From<Aggregate> for SelectItem {
    fn from(agg: Aggregate) -> Self {
        SelectItem::Aggregate(agg)
    }
}

/// Which columns a SELECT returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    All,
    /// Explicit list; must not be empty.
    Items(Vec<SelectItem>),
}

impl Projection {
    /// Explicit column list.
    pub fn columns<S: AsRef<str>>(columns: impl IntoIterator<Item = S>) -> Self {
        Projection::Items(
            columns
                .into_iter()
                .map(|c| SelectItem::Column(c.as_ref().to_string()))
                .collect(),
        )
    }

    /// Mixed columns and aggregates.
    pub fn items<I: Into<SelectItem>>(items: impl IntoIterator<Item = I>) -> Self {
        Projection::Items(items.into_iter().map(Into::into).collect())
    }
}

/// `["*"]` means [`Projection::All`]; anything else is a column list.
impl From<&[&str]> for Projection {
    fn from(columns: &[&str]) -> Self {
        if columns == ["*"] {
            Projection::All
        } else {
            Projection::columns(columns)
        }
    }
}

impl<const N: usize> From<[&str; N]> for Projection {
    fn from(columns: [&str; N]) -> Self {
        Projection::from(&columns[..])
    }
}

impl From<Vec<&str>> for Projection {
    fn from(columns: Vec<&str>) -> Self {
        Projection::from(columns.as_slice())
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// A SELECT with the optional clauses beyond WHERE.
///
/// # Example
/// ```
/// use sqlcraft::{Aggregate, CompareOp, Order, Predicate, Projection, SelectItem, SelectQuery};
///
/// let q = SelectQuery::new(Projection::items([
///         SelectItem::from("category"),
///         Aggregate::CountAll.alias("n"),
///     ]))
///     .filter(Predicate::gt("price", 10))
///     .group_by("category")
///     .having(Aggregate::CountAll, CompareOp::Gt, 2)
///     .order_by("category", Order::Asc)
///     .limit(5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub(crate) projection: Projection,
    pub(crate) predicate: Option<Predicate>,
    pub(crate) distinct: bool,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<(Aggregate, CompareOp, SqlValue)>,
    pub(crate) order_by: Vec<(String, Order)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl SelectQuery {
    pub fn new(projection: impl Into<Projection>) -> Self {
        Self {
            projection: projection.into(),
            predicate: None,
            distinct: false,
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a WHERE condition; repeated calls are ANDed.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Add a HAVING condition on an aggregate; repeated calls are ANDed.
    pub fn having(mut self, aggregate: Aggregate, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        self.having.push((aggregate, op, value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
