//! Per-category expense totals.

use crate::model::{Amount, AmountStyle, Legend, TransactionRecord, UNCATEGORIZED};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The spending of one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategorySummary {
    /// `None` for the uncategorized bucket.
    pub name: Option<String>,
    pub title: String,
    /// Total of the absolute amounts of the category's expenses.
    pub amount: Amount,
    pub amount_text: String,
    /// Share of all expenses, rounded to a whole number.
    pub pct: Decimal,
    /// The configured threshold, if the amount exceeds it.
    pub warning: Option<Amount>,
}

impl Display for CategorySummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} ({}%)", self.title, self.amount_text, self.pct)?;
        if self.warning.is_some() {
            write!(f, " /!\\")?;
        }
        Ok(())
    }
}

/// Sums expenses (negative amounts) per category.
///
/// A transaction counts towards each of its categories. Expenses without a category go to an
/// uncategorized bucket, listed last. Legend categories without any expense follow with a zero
/// total.
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
    legend: &Legend,
    style: &AmountStyle,
) -> Vec<CategorySummary> {
    let mut amounts: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut uncategorized = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for record in records {
        if !record.amount.is_negative() {
            continue;
        }
        let spent = record.amount.value().abs();
        if record.is_uncategorized() {
            uncategorized += spent;
            total += spent;
            continue;
        }
        for name in &record.categories {
            *amounts.entry(name.as_str()).or_default() += spent;
            total += spent;
        }
    }

    let summary_of = |name: Option<&str>, amount: Decimal| -> CategorySummary {
        let config = name.and_then(|n| legend.get(n));
        let pct = if total.is_zero() {
            Decimal::ZERO
        } else {
            (amount * Decimal::ONE_HUNDRED / total).round_dp(0)
        };
        let warning = config
            .and_then(|c| c.warning_threshold)
            .filter(|threshold| amount > *threshold)
            .map(Amount::new);
        let amount = Amount::new(amount);
        CategorySummary {
            name: name.map(String::from),
            title: match (config, name) {
                (Some(c), _) => c.title().to_string(),
                (None, Some(n)) => n.to_string(),
                (None, None) => UNCATEGORIZED.to_string(),
            },
            amount,
            amount_text: amount.display(style),
            pct,
            warning,
        }
    };

    let mut summary: Vec<CategorySummary> = amounts
        .iter()
        .map(|(name, amount)| summary_of(Some(*name), *amount))
        .collect();
    if uncategorized > Decimal::ZERO {
        summary.push(summary_of(None, uncategorized));
    }
    for category in legend.categories() {
        if !amounts.contains_key(category.name.as_str()) {
            summary.push(summary_of(Some(category.name.as_str()), Decimal::ZERO));
        }
    }
    summary
}
