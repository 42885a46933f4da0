//! Conjunctive filter composition for list queries
//!
//! A [`FilterBuilder`] starts from a condition that matches every row and
//! ANDs in one clause per supplied filter value. Absent or blank values leave
//! the condition untouched.

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Value};

use crate::models::fold_case;

/// Builder folding optional predicates over `Condition::all()`
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    condition: Condition,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBuilder {
    /// Starts from the "match everything" condition
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
        }
    }

    /// ANDs in the clause produced by `clause` when `value` is present
    pub fn matching<T, F>(mut self, value: Option<T>, clause: F) -> Self
    where
        F: FnOnce(T) -> SimpleExpr,
    {
        if let Some(value) = value {
            self.condition = self.condition.add(clause(value));
        }
        self
    }

    /// Case-insensitive substring match on a case-folded `*_search` column
    pub fn contains<C>(self, column: C, needle: Option<&str>) -> Self
    where
        C: ColumnTrait + 'static,
    {
        self.matching(non_blank(needle), |needle| contains_folded(column, needle))
    }

    /// Exact equality on `column`
    pub fn equals<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.matching(value, |value| column.eq(value))
    }

    /// Exact equality on a string column, skipping blank values
    pub fn equals_text<C>(self, column: C, value: Option<&str>) -> Self
    where
        C: ColumnTrait,
    {
        self.matching(non_blank(value), |value| column.eq(value.to_string()))
    }

    pub fn build(self) -> Condition {
        self.condition
    }
}

/// `column LIKE '%needle%'` against a column holding [`fold_case`]d text.
///
/// The needle is folded the same way and its LIKE wildcards are escaped.
pub fn contains_folded<C>(column: C, needle: &str) -> SimpleExpr
where
    C: ColumnTrait + 'static,
{
    let pattern = format!("%{}%", escape_like(&fold_case(needle)));
    Expr::col(column).like(LikeExpr::new(pattern).escape('\\'))
}

/// Returns the trimmed value, or `None` when it is missing or whitespace only
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
