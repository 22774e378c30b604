//! Composable row filters, ordering and limits.
//!
//! Filters start from [`var`] and compose with `&` and `|`:
//!
//! ```
//! use shark::clause::var;
//!
//! let filter = var("a").less_than(40) & var("b").not_equals(0);
//! ```
use std::ops::{BitAnd, BitOr};

/// Comparison operator of a single [`Where`] statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    IsNull,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

impl Operator {
    pub fn word(&self) -> &'static str {
        match self {
            Operator::IsNull => "is",
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEquals => "<=",
        }
    }
}

/// Boolean connective of a composed [`Where`] tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glue {
    And,
    Or,
}

impl Glue {
    pub fn word(&self) -> &'static str {
        match self {
            Glue::And => "and",
            Glue::Or => "or",
        }
    }
}

/// A binary tree of row filters.
#[derive(Clone, Debug, PartialEq)]
pub enum Where {
    Statement {
        field: String,
        op: Operator,
        /// Rendered comparison value.
        value: String,
        /// Whether `value` must pass through string escaping when the
        /// statement is rendered. Only literal string values set this.
        needs_escaping: bool,
    },
    Complex {
        left: Box<Where>,
        glue: Glue,
        right: Box<Where>,
    },
}

impl BitAnd for Where {
    type Output = Where;

    fn bitand(self, rhs: Where) -> Where {
        Where::Complex { left: Box::new(self), glue: Glue::And, right: Box::new(rhs) }
    }
}

impl BitOr for Where {
    type Output = Where;

    fn bitor(self, rhs: Where) -> Where {
        Where::Complex { left: Box::new(self), glue: Glue::Or, right: Box::new(rhs) }
    }
}

/// Start a filter statement on a column.
pub fn var(field: impl Into<String>) -> Var {
    Var(field.into())
}

/// A column reference waiting for its comparison.
#[derive(Debug)]
pub struct Var(String);

macro_rules! comparison {
    ($(
        $(#[$doc:meta])* $name:ident => $op:ident,
    )*) => {$(
        $(#[$doc])*
        pub fn $name<V: ClauseValue>(self, value: V) -> Where {
            Where::Statement {
                field: self.0,
                op: Operator::$op,
                value: value.literal(),
                needs_escaping: V::NEEDS_ESCAPING,
            }
        }
    )*};
}

impl Var {
    comparison! {
        equals => Equals,
        not_equals => NotEquals,
        greater_than => GreaterThan,
        greater_than_or_equals => GreaterThanOrEquals,
        less_than => LessThan,
        less_than_or_equals => LessThanOrEquals,
    }

    /// `field is null`.
    pub fn is_null(self) -> Where {
        Where::Statement {
            field: self.0,
            op: Operator::IsNull,
            value: String::from("null"),
            needs_escaping: false,
        }
    }
}

/// A literal usable on the right-hand side of a comparison.
pub trait ClauseValue {
    /// Whether the rendered value must be escaped as a string.
    const NEEDS_ESCAPING: bool;

    /// Lexical rendering of the value.
    fn literal(self) -> String;
}

macro_rules! clause_int {
    ($($ty:ty),*) => {$(
        impl ClauseValue for $ty {
            const NEEDS_ESCAPING: bool = false;

            fn literal(self) -> String {
                itoa::Buffer::new().format(self).into()
            }
        }
    )*};
}

macro_rules! clause_float {
    ($($ty:ty),*) => {$(
        impl ClauseValue for $ty {
            const NEEDS_ESCAPING: bool = false;

            fn literal(self) -> String {
                ryu::Buffer::new().format(self).into()
            }
        }
    )*};
}

clause_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);
clause_float!(f32, f64);

impl ClauseValue for bool {
    const NEEDS_ESCAPING: bool = false;

    fn literal(self) -> String {
        String::from(if self { "true" } else { "false" })
    }
}

impl ClauseValue for &str {
    const NEEDS_ESCAPING: bool = true;

    fn literal(self) -> String {
        self.into()
    }
}

impl ClauseValue for String {
    const NEEDS_ESCAPING: bool = true;

    fn literal(self) -> String {
        self
    }
}

impl ClauseValue for char {
    const NEEDS_ESCAPING: bool = true;

    fn literal(self) -> String {
        self.to_string()
    }
}

/// Result ordering, either by columns or by the backend's random function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Order {
    pub(crate) rand: bool,
    pub(crate) fields: Vec<OrderField>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OrderField {
    pub name: String,
    pub asc: bool,
}

impl Order {
    /// Order ascending by a column.
    pub fn by(name: impl Into<String>) -> Order {
        Order::default().and(name)
    }

    /// Order descending by a column.
    pub fn by_desc(name: impl Into<String>) -> Order {
        Order::default().and_desc(name)
    }

    /// Random ordering. Overrides any column ordering.
    pub fn random() -> Order {
        Order { rand: true, fields: Vec::new() }
    }

    /// Add a further ascending column.
    pub fn and(mut self, name: impl Into<String>) -> Order {
        self.fields.push(OrderField { name: name.into(), asc: true });
        self
    }

    /// Add a further descending column.
    pub fn and_desc(mut self, name: impl Into<String>) -> Order {
        self.fields.push(OrderField { name: name.into(), asc: false });
        self
    }
}

/// A row count limit, optionally with an offset.
///
/// The `(0, 0)` value means no limit and renders nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Limit {
    pub(crate) lower: usize,
    pub(crate) upper: usize,
}

impl Limit {
    /// No limit.
    pub const fn none() -> Limit {
        Limit { lower: 0, upper: 0 }
    }

    /// The first `count` rows.
    ///
    /// # Panics
    ///
    /// `count` must be positive; use [`Limit::none`] for no limit.
    pub fn top(count: usize) -> Limit {
        assert!(count > 0, "limit count must be positive");
        Limit { lower: 0, upper: count }
    }

    /// An offset and count pair.
    ///
    /// # Panics
    ///
    /// Requires `lower < upper` and a positive `upper`.
    pub fn range(lower: usize, upper: usize) -> Limit {
        assert!(upper > 0, "limit upper bound must be positive");
        assert!(lower < upper, "limit lower bound must be below the upper bound");
        Limit { lower, upper }
    }

    pub const fn is_none(&self) -> bool {
        self.upper == 0
    }
}

/// A complete select specification: filter, ordering, limit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Select {
    pub(crate) filter: Option<Where>,
    pub(crate) order: Option<Order>,
    pub(crate) limit: Limit,
}

impl Select {
    pub fn new() -> Select {
        Select::default()
    }

    pub fn filter(mut self, filter: Where) -> Select {
        self.filter = Some(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Select {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: Limit) -> Select {
        self.limit = limit;
        self
    }
}

impl From<Where> for Select {
    fn from(filter: Where) -> Select {
        Select::new().filter(filter)
    }
}

impl From<Order> for Select {
    fn from(order: Order) -> Select {
        Select::new().order(order)
    }
}

impl From<Limit> for Select {
    fn from(limit: Limit) -> Select {
        Select::new().limit(limit)
    }
}
