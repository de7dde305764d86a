//! # Filter Program AST
//!
//! Compiled representation of a filter expression: a predicate tree plus
//! sort keys. Storage backends consume this directly.

use std::fmt;

/// Comparison relations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `=`: every word of the value occurs in the field (case-insensitive)
    Contains,
    /// `==`: exact match, `*` wildcard allowed
    Exact,
    /// `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Contains => "=",
            Relation::Exact => "==",
            Relation::NotEqual => "<>",
            Relation::Less => "<",
            Relation::LessOrEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

/// Dotted path into a JSON document (`address.city`).
///
/// Segments are restricted to `[A-Za-z_][A-Za-z0-9_]*` by the compiler, which
/// lets storage backends embed the path in generated SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// SQLite JSON path (`$.address.city`)
    pub fn json_path(&self) -> String {
        format!("$.{}", self.segments.join("."))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A single `field relation value` clause
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: FieldPath,
    pub relation: Relation,
    pub value: String,
}

impl Comparison {
    /// The value as a number, when it parses as one
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

/// Boolean predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    All,
    Compare(Comparison),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    /// `left not right` (left and not right)
    AndNot(Box<Predicate>, Box<Predicate>),
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One `sortBy` key
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: FieldPath,
    pub direction: SortDirection,
}

/// Compiled filter: predicate plus ordering
#[derive(Debug, Clone, PartialEq)]
pub struct FilterProgram {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
}

impl FilterProgram {
    /// Match everything, storage default ordering
    pub fn match_all() -> Self {
        Self {
            predicate: Predicate::All,
            sort: Vec::new(),
        }
    }
}
