use crate::model::{Amount, AmountStyle};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A transaction as the server hands it to the page, before anything is rendered.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionEntry {
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
    pub amount: Amount,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

impl TransactionEntry {
    /// Converts the entry into the record the page will show for it.
    pub fn into_record(self, style: &AmountStyle) -> TransactionRecord {
        let amount_text = self.amount.display(style);
        TransactionRecord {
            id: self.id,
            date: TxDate::from(self.date),
            label: self.label,
            amount: self.amount,
            amount_text,
            categories: self.categories,
            goal: self.goal,
        }
    }
}

/// The canonical view of one rendered transaction.
///
/// Records are read projections. They are recomputed from the rendered node whenever they are
/// needed and are never cached across edits.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionRecord {
    pub id: String,
    pub date: TxDate,
    pub label: String,
    /// The raw signed value.
    pub amount: Amount,
    /// The pre-formatted display string.
    pub amount_text: String,
    /// Category names in rendering order. Empty means uncategorized.
    pub categories: Vec<String>,
    pub goal: Option<String>,
}

impl TransactionRecord {
    pub fn is_uncategorized(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    pub fn annotations(&self) -> Annotations {
        Annotations {
            categories: self.categories.clone(),
            goal: self.goal.clone(),
        }
    }

    /// Replaces the categories and goal with `annotations`.
    pub fn annotate(&mut self, annotations: Annotations) {
        self.categories = annotations.categories;
        self.goal = annotations.goal;
    }
}

/// The category and goal set of one transaction.
///
/// This is also the shape of the body a server may return from a submission to state which
/// annotations it actually accepted.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Annotations {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

impl Annotations {
    /// Drops empty names and duplicate categories, and turns an empty goal into no goal.
    pub fn normalized(self) -> Self {
        let mut categories: Vec<String> = Vec::with_capacity(self.categories.len());
        for name in self.categories {
            if !name.is_empty() && !categories.contains(&name) {
                categories.push(name);
            }
        }
        Self {
            categories,
            goal: self.goal.filter(|g| !g.is_empty()),
        }
    }
}

/// The date of a transaction as read from the page.
///
/// An unparseable date does not fail extraction. It is carried as an invalid date, which has no
/// month, and only the operations that need the month report it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct TxDate(Option<NaiveDate>);

impl TxDate {
    /// Parses an ISO date (`2024-03-02`) or an ISO date-time, with or without offset.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Self(Some(d));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Self(Some(dt.date_naive()));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self(Some(dt.date()));
        }
        Self(None)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// The 1-indexed month, if the date is valid.
    pub fn month(&self) -> Option<u32> {
        self.0.map(|d| d.month())
    }
}

impl From<NaiveDate> for TxDate {
    fn from(value: NaiveDate) -> Self {
        Self(Some(value))
    }
}

impl Display for TxDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            None => write!(f, "invalid date"),
        }
    }
}

impl Serialize for TxDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Some(_) => serializer.serialize_str(&self.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for TxDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        Ok(s.map(|s| TxDate::parse(&s)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_tx_date_parse() {
        assert_eq!(TxDate::parse("2024-03-02").month(), Some(3));
        assert_eq!(TxDate::parse("2024-12-31T23:00:00").month(), Some(12));
        assert_eq!(TxDate::parse("2024-01-05T10:00:00+02:00").month(), Some(1));
    }

    #[test]
    fn test_tx_date_invalid() {
        let date = TxDate::parse("yesterday");
        assert!(!date.is_valid());
        assert_eq!(date.month(), None);
        assert_eq!(date.to_string(), "invalid date");
    }

    #[test]
    fn test_tx_date_serde() {
        let date = TxDate::parse("2024-03-02");
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-02\"");
        let invalid: TxDate = serde_json::from_str("null").unwrap();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_annotations_normalized() {
        let annotations = Annotations {
            categories: vec!["Food".into(), "".into(), "Rent".into(), "Food".into()],
            goal: Some(String::new()),
        }
        .normalized();
        assert_eq!(annotations.categories, vec!["Food", "Rent"]);
        assert_eq!(annotations.goal, None);
    }

    #[test]
    fn test_entry_into_record() {
        let entry: TransactionEntry = serde_json::from_str(
            r#"{"id": "t1", "date": "2024-03-02", "label": "Bakery", "amount": "-4.5"}"#,
        )
        .unwrap();
        let record = entry.into_record(&AmountStyle::default());
        assert_eq!(record.amount_text, "-4.50€");
        assert_eq!(record.amount, Amount::from_str("-4.5").unwrap());
        assert!(record.is_uncategorized());
        assert_eq!(record.goal, None);
    }
}
