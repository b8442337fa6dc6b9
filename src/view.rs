//! Renders the page from the transaction store.
//!
//! The page has four parts:
//! - the category legend: `#categories-bar > span.legend-entry[data-name][title][style]`
//! - the filter indicators: `#filter-title` and `#clear-filter`
//! - the transaction lists: `ul.transactions > li.transaction`, split by `#show-more` into a
//!   visible list and a collapsed `ul.transactions.hidden`
//! - the editor: `#transaction-options > form`

use crate::dom::{Document, NodeId};
use crate::model::{Annotations, Legend, TransactionRecord, TransactionStore, UNCATEGORIZED};
use crate::Result;
use anyhow::Context;
use std::collections::BTreeMap;

pub(crate) const TRANSACTIONS: &str = "transactions";
pub(crate) const TRANSACTION: &str = "transaction";
pub(crate) const HIDDEN: &str = "hidden";
pub(crate) const HIDE: &str = "hide";
pub(crate) const SHOW_MORE: &str = "show-more";
pub(crate) const CATEGORIES_BAR: &str = "categories-bar";
pub(crate) const LEGEND_ENTRY: &str = "legend-entry";
pub(crate) const FILTER_TITLE: &str = "filter-title";
pub(crate) const CLEAR_FILTER: &str = "clear-filter";
pub(crate) const TRANSACTION_OPTIONS: &str = "transaction-options";
pub(crate) const VISIBLE: &str = "visible";
pub(crate) const NEW: &str = "new";
pub(crate) const ADD_CATEGORY: &str = "add-category";
pub(crate) const CATEGORY: &str = "category";
pub(crate) const GOAL: &str = "goal";
pub(crate) const LABEL: &str = "label";
pub(crate) const AMOUNT: &str = "amount";
pub(crate) const CATEGORIES_FIELD: &str = "categories";
pub(crate) const GOAL_FIELD: &str = "goal";

const GOAL_MARK: &str = "★";
const EDIT_ACTION: &str = "edit";
const DISPLAY_NONE: &str = "display: none";

/// Everything the page is rendered from.
pub struct PageSource<'a> {
    pub store: &'a TransactionStore,
    pub legend: &'a Legend,
    pub goals: &'a [String],
    pub action_base: &'a str,
    /// Number of transactions shown before the "show more" control.
    pub page_size: usize,
}

/// Renders the whole page.
pub fn render_page(source: &PageSource<'_>) -> Result<Document> {
    let mut doc = Document::new();
    let root = doc.root();

    let styles = category_styles(source);
    render_legend(&mut doc, root, source.legend);

    let title = doc.element(root, "h3");
    doc.set_attr(title, "id", FILTER_TITLE);
    doc.set_attr(title, "style", DISPLAY_NONE);
    let clear = doc.element(root, "a");
    doc.set_attr(clear, "id", CLEAR_FILTER);
    doc.set_attr(clear, "style", DISPLAY_NONE);
    doc.set_text(clear, "Clear filter");

    let list = doc.element(root, "ul");
    doc.add_class(list, TRANSACTIONS);
    let mut collapsed = None;
    for (ix, record) in source.store.iter().enumerate() {
        let parent = if ix < source.page_size {
            list
        } else {
            *collapsed.get_or_insert_with(|| {
                let more = doc.element(root, "a");
                doc.set_attr(more, "id", SHOW_MORE);
                doc.set_text(more, "Show more");
                let hidden = doc.element(root, "ul");
                doc.add_class(hidden, TRANSACTIONS);
                doc.add_class(hidden, HIDDEN);
                hidden
            })
        };
        render_transaction(&mut doc, parent, record, |name| {
            styles.get(name).cloned().flatten()
        })?;
    }

    render_editor(&mut doc, root, source, &styles);
    Ok(doc)
}

/// Styles of every category the page knows: the legend's first, then any other category found
/// on a transaction, which has no style.
fn category_styles(source: &PageSource<'_>) -> BTreeMap<String, Option<String>> {
    let mut styles: BTreeMap<String, Option<String>> = source
        .legend
        .categories()
        .iter()
        .map(|c| (c.name.clone(), c.style()))
        .collect();
    for record in source.store.iter() {
        for name in &record.categories {
            styles.entry(name.clone()).or_insert(None);
        }
    }
    styles
}

fn render_legend(doc: &mut Document, root: NodeId, legend: &Legend) {
    let bar = doc.element(root, "div");
    doc.set_attr(bar, "id", CATEGORIES_BAR);
    for category in legend.categories() {
        legend_entry(doc, bar, &category.name, category.title(), category.style());
    }
    legend_entry(doc, bar, UNCATEGORIZED, UNCATEGORIZED, None);
}

fn legend_entry(doc: &mut Document, bar: NodeId, name: &str, title: &str, style: Option<String>) {
    let entry = doc.element(bar, "span");
    doc.add_class(entry, LEGEND_ENTRY);
    doc.set_attr(entry, "data-name", name);
    doc.set_attr(entry, "title", title);
    if let Some(style) = style {
        doc.set_attr(entry, "style", style);
    }
    doc.set_text(entry, title);
}

/// Renders one transaction as the last child of `parent`.
pub fn render_transaction(
    doc: &mut Document,
    parent: NodeId,
    record: &TransactionRecord,
    style_of: impl Fn(&str) -> Option<String>,
) -> Result<NodeId> {
    let li = doc.element(parent, "li");
    doc.add_class(li, TRANSACTION);
    doc.set_attr(li, "data-tx-id", &record.id);
    doc.set_attr(li, "data-tx-date", record.date.to_string());
    doc.set_attr(li, "data-tx-amount", record.amount.to_string());
    doc.set_attr(li, "data-action", EDIT_ACTION);

    let date = doc.element(li, "span");
    doc.add_class(date, "date");
    doc.set_text(date, record.date.to_string());
    let label = doc.element(li, "span");
    doc.add_class(label, LABEL);
    doc.set_text(label, &record.label);
    let amount = doc.element(li, "span");
    doc.add_class(amount, AMOUNT);
    doc.set_text(amount, &record.amount_text);

    render_annotations(doc, li, &record.annotations(), style_of)?;
    Ok(li)
}

/// Replaces the goal marker and category tags of transaction `node` with `annotations`.
///
/// The goal marker goes first and the category tags follow, all immediately before the amount.
/// A transaction without categories gets a single empty tag.
pub fn render_annotations(
    doc: &mut Document,
    node: NodeId,
    annotations: &Annotations,
    style_of: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let stale = doc.select(node, |e| e.has_class(CATEGORY) || e.has_class(GOAL));
    for n in stale {
        doc.detach(n);
    }
    let before = doc
        .select_first(node, |e| e.has_class(AMOUNT))
        .context("The transaction has no amount element")?;

    if let Some(goal) = &annotations.goal {
        let span = doc.create("span");
        doc.add_class(span, GOAL);
        doc.set_attr(span, "title", goal);
        doc.set_attr(span, "data-action", EDIT_ACTION);
        doc.set_text(span, GOAL_MARK);
        doc.insert_before(before, span)?;
    }
    for name in &annotations.categories {
        let span = doc.create("span");
        doc.add_class(span, CATEGORY);
        doc.set_attr(span, "title", name);
        doc.set_attr(span, "data-action", EDIT_ACTION);
        if let Some(style) = style_of(name) {
            doc.set_attr(span, "style", style);
        }
        doc.set_text(span, name);
        doc.insert_before(before, span)?;
    }
    if annotations.categories.is_empty() {
        let span = doc.create("span");
        doc.add_class(span, CATEGORY);
        doc.set_attr(span, "data-action", EDIT_ACTION);
        doc.insert_before(before, span)?;
    }
    Ok(())
}

fn render_editor(
    doc: &mut Document,
    root: NodeId,
    source: &PageSource<'_>,
    styles: &BTreeMap<String, Option<String>>,
) {
    let modal = doc.element(root, "div");
    doc.set_attr(modal, "id", TRANSACTION_OPTIONS);
    let form = doc.element(modal, "form");
    doc.set_attr(form, "method", "post");
    doc.set_attr(form, "data-action-base", source.action_base);
    let _ = doc.element(form, "h4");

    let categories = doc.element(form, "div");
    doc.add_class(categories, "categories");
    for (name, style) in legend_ordered(source, styles) {
        category_control(doc, categories, name, style.as_deref());
    }
    let add = doc.element(categories, "a");
    doc.add_class(add, ADD_CATEGORY);
    doc.set_text(add, "+");

    let goals = doc.element(form, "div");
    doc.add_class(goals, "goals");
    goal_control(doc, goals, "", "None");
    let mut seen: Vec<&str> = Vec::new();
    let used = source.store.iter().filter_map(|r| r.goal.as_deref());
    for goal in source.goals.iter().map(String::as_str).chain(used) {
        if !goal.is_empty() && !seen.contains(&goal) {
            seen.push(goal);
            goal_control(doc, goals, goal, goal);
        }
    }

    let submit = doc.element(form, "button");
    doc.set_attr(submit, "type", "submit");
    doc.set_text(submit, "Save");
}

/// Legend categories in legend order, followed by the unlisted ones alphabetically.
fn legend_ordered<'a>(
    source: &'a PageSource<'_>,
    styles: &'a BTreeMap<String, Option<String>>,
) -> Vec<(&'a str, &'a Option<String>)> {
    let mut ordered: Vec<(&str, &Option<String>)> = source
        .legend
        .categories()
        .iter()
        .filter_map(|c| styles.get_key_value(&c.name))
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    for (name, style) in styles {
        if source.legend.get(name).is_none() {
            ordered.push((name.as_str(), style));
        }
    }
    ordered
}

/// Creates `label.category > input[type=checkbox][name=categories]` followed by `name`.
/// The label is returned detached.
pub(crate) fn new_category_control(doc: &mut Document, name: &str, style: Option<&str>) -> NodeId {
    let label = doc.create("label");
    doc.add_class(label, CATEGORY);
    if let Some(style) = style {
        doc.set_attr(label, "style", style);
    }
    let input = doc.element(label, "input");
    doc.set_attr(input, "type", "checkbox");
    doc.set_attr(input, "name", CATEGORIES_FIELD);
    doc.set_attr(input, "value", name);
    doc.set_text(label, name);
    label
}

fn category_control(doc: &mut Document, parent: NodeId, name: &str, style: Option<&str>) {
    let label = new_category_control(doc, name, style);
    doc.append(parent, label);
}

fn goal_control(doc: &mut Document, parent: NodeId, value: &str, text: &str) {
    let label = doc.element(parent, "label");
    let input = doc.element(label, "input");
    doc.set_attr(input, "type", "radio");
    doc.set_attr(input, "name", GOAL_FIELD);
    doc.set_attr(input, "value", value);
    doc.set_text(label, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixture_page;

    #[test]
    fn test_show_more_splits_lists() {
        let page = fixture_page(2);
        let doc = page.document();
        let lists = doc.select(doc.root(), |e| e.is("ul") && e.has_class(TRANSACTIONS));
        assert_eq!(lists.len(), 2);
        assert_eq!(doc.get(lists[0]).children().len(), 2);
        assert!(doc.get(lists[1]).has_class(HIDDEN));
        assert!(doc.by_id(SHOW_MORE).is_some());
    }

    #[test]
    fn test_no_show_more_when_everything_fits() {
        let page = fixture_page(100);
        let doc = page.document();
        assert!(doc.by_id(SHOW_MORE).is_none());
        assert!(doc
            .select_first(doc.root(), |e| e.has_class(HIDDEN))
            .is_none());
    }

    #[test]
    fn test_transaction_column_order() {
        let page = fixture_page(100);
        let doc = page.document();
        let node = page.node("t3").unwrap();
        let classes: Vec<&str> = doc
            .get(node)
            .children()
            .iter()
            .map(|c| doc.get(*c).classes()[0].as_str())
            .collect();
        assert_eq!(classes, vec!["date", "label", GOAL, CATEGORY, CATEGORY, AMOUNT]);
    }

    #[test]
    fn test_uncategorized_has_one_empty_tag() {
        let page = fixture_page(100);
        let doc = page.document();
        let node = page.node("t2").unwrap();
        let tags = doc.select(node, |e| e.has_class(CATEGORY));
        assert_eq!(tags.len(), 1);
        assert_eq!(doc.inner_text(tags[0]), "");
    }

    #[test]
    fn test_legend_and_form_controls() {
        let page = fixture_page(100);
        let doc = page.document();
        let bar = doc.by_id(CATEGORIES_BAR).unwrap();
        let names: Vec<&str> = doc
            .get(bar)
            .children()
            .iter()
            .filter_map(|c| doc.get(*c).attr("data-name"))
            .collect();
        assert_eq!(names, vec!["Food", "Rent", "Transport", UNCATEGORIZED]);

        let modal = doc.by_id(TRANSACTION_OPTIONS).unwrap();
        let values: Vec<&str> = doc
            .select(modal, |e| e.attr("name") == Some(CATEGORIES_FIELD))
            .into_iter()
            .filter_map(|n| doc.get(n).attr("value"))
            .collect();
        // "Gifts" is used by a transaction but missing from the legend.
        assert_eq!(values, vec!["Food", "Rent", "Transport", "Gifts"]);

        let goals: Vec<&str> = doc
            .select(modal, |e| e.attr("name") == Some(GOAL_FIELD))
            .into_iter()
            .filter_map(|n| doc.get(n).attr("value"))
            .collect();
        assert_eq!(goals, vec!["", "Vacation", "Car"]);
    }

    #[test]
    fn test_html_contains_transaction_attributes() {
        let page = fixture_page(100);
        let html = page.to_html();
        assert!(html.contains(r#"data-tx-id="t1""#));
        assert!(html.contains(r#"data-tx-date="2024-03-02""#));
        assert!(html.contains(r#"data-tx-amount="-42.10""#));
        assert!(html.contains("-42.10€"));
    }
}
