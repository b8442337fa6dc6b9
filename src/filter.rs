//! Hides and reveals transactions on the page.

use crate::dom::{Document, NodeId};
use crate::extract::extract;
use crate::model::{Dimension, FilterCriterion};
use crate::registry::CategoryRegistry;
use crate::view::{CLEAR_FILTER, FILTER_TITLE, HIDDEN, HIDE, SHOW_MORE, TRANSACTION, TRANSACTIONS};
use crate::Result;
use serde::Serialize;
use tracing::debug;

const DISPLAY_BLOCK: &str = "display: block";
const DISPLAY_NONE: &str = "display: none";

/// The result of applying a filter.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct FilterOutcome {
    /// Ids of the transactions left visible, in page order.
    pub visible: Vec<String>,
    /// Ids of the hidden transactions, in page order.
    pub hidden: Vec<String>,
    /// The filter title, if the criterion set one.
    pub title: Option<String>,
}

/// Removes the "show more" control and expands the collapsed list. Does nothing if the page has
/// no collapsed list.
pub fn show_all(doc: &mut Document) {
    let Some(more) = doc.by_id(SHOW_MORE) else {
        return;
    };
    doc.detach(more);
    let collapsed = doc.select(doc.root(), |e| {
        e.is("ul") && e.has_class(TRANSACTIONS) && e.has_class(HIDDEN)
    });
    for list in collapsed {
        doc.remove_class(list, HIDDEN);
    }
    debug!("Expanded the collapsed transactions");
}

/// Every transaction node of every list, in page order.
pub fn transaction_nodes(doc: &Document) -> Vec<NodeId> {
    doc.select(doc.root(), |e| e.is("ul") && e.has_class(TRANSACTIONS))
        .into_iter()
        .flat_map(|list| doc.select(list, |e| e.is("li") && e.has_class(TRANSACTION)))
        .collect()
}

/// Shows only the transactions matching `criterion` and displays the filter title. Every
/// transaction is matched against the record extracted from its node.
///
/// The title is the legend title of the filtered category ("Uncategorized" for `Absent`), or the
/// goal name when filtering on a goal, which takes precedence. The title and every record are
/// read before the page is touched, so an error leaves the page unchanged.
///
/// # Errors
/// - Returns an error if the filtered category has no legend entry.
/// - Returns an error if the page has no filter indicators.
/// - Returns an error if a transaction node cannot be read.
pub fn apply_filter(doc: &mut Document, criterion: &FilterCriterion) -> Result<FilterOutcome> {
    let title = filter_title(doc, criterion)?;
    let title_node = doc.require_id(FILTER_TITLE)?;
    let clear_node = doc.require_id(CLEAR_FILTER)?;

    let records = transaction_nodes(doc)
        .into_iter()
        .map(|node| Ok((node, extract(doc, node)?)))
        .collect::<Result<Vec<_>>>()?;

    show_all(doc);
    let mut outcome = FilterOutcome {
        title: title.clone(),
        ..FilterOutcome::default()
    };
    for (node, record) in records {
        if criterion.matches(&record) {
            doc.remove_class(node, HIDE);
            outcome.visible.push(record.id);
        } else {
            doc.add_class(node, HIDE);
            outcome.hidden.push(record.id);
        }
    }

    if let Some(title) = title {
        doc.set_text(title_node, title);
    }
    doc.set_attr(title_node, "style", DISPLAY_BLOCK);
    doc.set_attr(clear_node, "style", DISPLAY_BLOCK);
    debug!(
        "Filter {criterion:?} kept {} of {} transactions",
        outcome.visible.len(),
        outcome.visible.len() + outcome.hidden.len()
    );
    Ok(outcome)
}

fn filter_title(doc: &Document, criterion: &FilterCriterion) -> Result<Option<String>> {
    let mut title = match &criterion.category {
        Dimension::Any => None,
        Dimension::Absent => Some(CategoryRegistry::new(doc)?.lookup("")?.title),
        Dimension::Value(name) => Some(CategoryRegistry::new(doc)?.lookup(name)?.title),
    };
    if let Dimension::Value(goal) = &criterion.goal {
        if !goal.is_empty() {
            title = Some(goal.clone());
        }
    }
    Ok(title)
}

/// Reveals every transaction and hides the filter indicators. Clearing twice is harmless.
pub fn clear_filter(doc: &mut Document) -> Result<()> {
    let title_node = doc.require_id(FILTER_TITLE)?;
    let clear_node = doc.require_id(CLEAR_FILTER)?;
    for node in transaction_nodes(doc) {
        doc.remove_class(node, HIDE);
    }
    doc.set_attr(title_node, "style", DISPLAY_NONE);
    doc.set_attr(clear_node, "style", DISPLAY_NONE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixture_page;

    fn hidden_ids(page: &crate::Page) -> Vec<String> {
        let doc = page.document();
        transaction_nodes(doc)
            .into_iter()
            .filter(|n| doc.get(*n).has_class(HIDE))
            .filter_map(|n| doc.get(n).attr("data-tx-id").map(String::from))
            .collect()
    }

    fn indicator_style(page: &crate::Page, id: &str) -> Option<String> {
        let doc = page.document();
        doc.get(doc.by_id(id).unwrap())
            .attr("style")
            .map(String::from)
    }

    #[test]
    fn test_filter_by_category_and_clear() {
        let mut page = fixture_page(100);
        let outcome = page.apply_filter(&FilterCriterion::category("Food")).unwrap();
        assert_eq!(outcome.visible, vec!["t1"]);
        assert_eq!(outcome.hidden, vec!["t2", "t3", "t4", "t5"]);
        assert_eq!(outcome.title.as_deref(), Some("Groceries & Restaurants"));
        assert_eq!(hidden_ids(&page), vec!["t2", "t3", "t4", "t5"]);
        let doc = page.document();
        assert_eq!(
            doc.inner_text(doc.by_id(FILTER_TITLE).unwrap()),
            "Groceries & Restaurants"
        );
        assert_eq!(indicator_style(&page, FILTER_TITLE).as_deref(), Some(DISPLAY_BLOCK));
        assert_eq!(indicator_style(&page, CLEAR_FILTER).as_deref(), Some(DISPLAY_BLOCK));

        page.clear_filter().unwrap();
        assert!(hidden_ids(&page).is_empty());
        assert_eq!(indicator_style(&page, FILTER_TITLE).as_deref(), Some(DISPLAY_NONE));
        assert_eq!(indicator_style(&page, CLEAR_FILTER).as_deref(), Some(DISPLAY_NONE));

        // Idempotent.
        page.clear_filter().unwrap();
        assert!(hidden_ids(&page).is_empty());
    }

    #[test]
    fn test_filter_uncategorized() {
        let mut page = fixture_page(100);
        let outcome = page.apply_filter(&FilterCriterion::uncategorized()).unwrap();
        assert_eq!(outcome.visible, vec!["t2", "t5"]);
        assert_eq!(outcome.title.as_deref(), Some("Uncategorized"));
    }

    #[test]
    fn test_filter_by_goal() {
        let mut page = fixture_page(100);
        let outcome = page.apply_filter(&FilterCriterion::goal("Vacation")).unwrap();
        assert_eq!(outcome.visible, vec!["t3", "t5"]);
        assert_eq!(outcome.title.as_deref(), Some("Vacation"));
        let doc = page.document();
        assert_eq!(doc.inner_text(doc.by_id(FILTER_TITLE).unwrap()), "Vacation");
    }

    #[test]
    fn test_goal_title_wins_over_category() {
        let mut page = fixture_page(100);
        let criterion = FilterCriterion::new(
            Dimension::Value("Rent".to_string()),
            Dimension::Value("Vacation".to_string()),
        );
        let outcome = page.apply_filter(&criterion).unwrap();
        assert_eq!(outcome.visible, vec!["t3"]);
        assert_eq!(outcome.title.as_deref(), Some("Vacation"));
    }

    #[test]
    fn test_filter_expands_collapsed_list() {
        let mut page = fixture_page(2);
        assert!(page.document().by_id(SHOW_MORE).is_some());
        let outcome = page.apply_filter(&FilterCriterion::goal("Car")).unwrap();
        assert_eq!(outcome.visible, vec!["t4"]);
        let doc = page.document();
        assert!(doc.by_id(SHOW_MORE).is_none());
        assert!(doc.select_first(doc.root(), |e| e.has_class(HIDDEN)).is_none());
    }

    #[test]
    fn test_unknown_category_leaves_page_unchanged() {
        let mut page = fixture_page(2);
        let before = page.to_html();
        assert!(page.apply_filter(&FilterCriterion::category("Gifts")).is_err());
        assert_eq!(before, page.to_html());
    }

    #[test]
    fn test_unreadable_transaction_leaves_page_unchanged() {
        let mut page = fixture_page(2);
        let node = page.node("t4").unwrap();
        page.document_mut().remove_attr(node, "data-tx-amount");
        let before = page.to_html();
        assert!(page.apply_filter(&FilterCriterion::category("Food")).is_err());
        assert_eq!(before, page.to_html());
        assert!(hidden_ids(&page).is_empty());
        assert!(page.document().by_id(SHOW_MORE).is_some());
    }

    #[test]
    fn test_show_all_without_collapsed_list() {
        let mut page = fixture_page(100);
        let before = page.to_html();
        show_all(page.document_mut());
        assert_eq!(before, page.to_html());
    }
}
