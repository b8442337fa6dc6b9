//! Reads a `TransactionRecord` back out of a rendered transaction.

use crate::dom::{Document, NodeId};
use crate::model::{Amount, TransactionRecord, TxDate};
use crate::view::{AMOUNT, CATEGORY, GOAL, LABEL, TRANSACTION};
use crate::Result;
use anyhow::Context;
use std::str::FromStr;

/// Resolves `node`, or the transaction that contains it, to the transaction node.
pub fn transaction_for(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.closest(node, |e| e.is("li") && e.has_class(TRANSACTION))
}

/// Derives the record of the rendered transaction `node`. Does not modify the document.
///
/// # Errors
/// - Returns an error if the node has no `data-tx-id`, no `data-tx-amount`, no `.label` or no
///   `.amount`, or if `data-tx-amount` is not a decimal number.
///
/// A malformed `data-tx-date` is not an error, it yields an invalid `TxDate`.
pub fn extract(doc: &Document, node: NodeId) -> Result<TransactionRecord> {
    let element = doc.get(node);
    let id = element
        .attr("data-tx-id")
        .context("The transaction has no data-tx-id")?
        .to_string();
    let date = TxDate::parse(element.attr("data-tx-date").unwrap_or_default());
    let raw_amount = element
        .attr("data-tx-amount")
        .with_context(|| format!("Transaction '{id}' has no data-tx-amount"))?;
    let amount = Amount::from_str(raw_amount)
        .with_context(|| format!("Transaction '{id}' has an invalid amount '{raw_amount}'"))?;

    let label = doc
        .select_first(node, |e| e.has_class(LABEL))
        .with_context(|| format!("Transaction '{id}' has no label"))?;
    let amount_node = doc
        .select_first(node, |e| e.has_class(AMOUNT))
        .with_context(|| format!("Transaction '{id}' has no amount"))?;

    let categories = doc
        .select(node, |e| e.has_class(CATEGORY))
        .into_iter()
        .map(|n| doc.inner_text(n))
        .filter(|text| !text.is_empty())
        .collect();
    let goal = doc
        .select_first(node, |e| e.has_class(GOAL))
        .and_then(|n| doc.get(n).attr("title"))
        .map(String::from);

    Ok(TransactionRecord {
        id,
        date,
        label: doc.inner_text(label),
        amount,
        amount_text: doc.inner_text(amount_node),
        categories,
        goal,
    })
}
