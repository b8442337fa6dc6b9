use crate::model::TransactionRecord;
use serde::{Deserialize, Serialize};

/// One dimension of a filter criterion.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Dimension<T> {
    /// Do not filter on this dimension.
    #[default]
    Any,
    /// Keep only transactions that have nothing for this dimension.
    Absent,
    /// Keep only transactions that have this value.
    Value(T),
}

impl Dimension<String> {
    /// `None` means no filter, an empty string means filter for absence.
    pub fn from_optional(value: Option<&str>) -> Self {
        match value {
            None => Dimension::Any,
            Some("") => Dimension::Absent,
            Some(v) => Dimension::Value(v.to_string()),
        }
    }

    /// Turns `Value("")` into `Absent`.
    pub fn normalized(self) -> Self {
        match self {
            Dimension::Value(v) if v.is_empty() => Dimension::Absent,
            other => other,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Dimension::Any)
    }
}

/// A partial predicate over category and goal. Present dimensions are combined with AND.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterCriterion {
    #[serde(default)]
    pub category: Dimension<String>,
    #[serde(default)]
    pub goal: Dimension<String>,
}

impl FilterCriterion {
    pub fn new(category: Dimension<String>, goal: Dimension<String>) -> Self {
        Self {
            category: category.normalized(),
            goal: goal.normalized(),
        }
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self::new(Dimension::Value(name.into()), Dimension::Any)
    }

    pub fn uncategorized() -> Self {
        Self::new(Dimension::Absent, Dimension::Any)
    }

    pub fn goal(name: impl Into<String>) -> Self {
        Self::new(Dimension::Any, Dimension::Value(name.into()))
    }

    pub fn category_matches(&self, record: &TransactionRecord) -> bool {
        match &self.category {
            Dimension::Any => true,
            Dimension::Value(name) if !name.is_empty() => record.has_category(name),
            Dimension::Value(_) | Dimension::Absent => record.is_uncategorized(),
        }
    }

    pub fn goal_matches(&self, record: &TransactionRecord) -> bool {
        match &self.goal {
            Dimension::Any => true,
            Dimension::Value(name) if !name.is_empty() => record.goal.as_deref() == Some(name),
            Dimension::Value(_) | Dimension::Absent => record.goal.is_none(),
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.category_matches(record) && self.goal_matches(record)
    }
}
