//! Applies a confirmed edit to the store and to the page.

use crate::dom::{Document, NodeId};
use crate::editor::FormState;
use crate::model::{TransactionRecord, TransactionStore};
use crate::registry::CategoryRegistry;
use crate::submit::Accepted;
use crate::view::{render_annotations, CATEGORY, NEW, TRANSACTION_OPTIONS};
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Updates transaction `id` after the server accepted an edit.
///
/// The annotations the server echoed back win over the submitted form. The store is updated
/// first and the transaction node is re-rendered from it, so the two cannot disagree. Category
/// tags take the style of the form control they were checked with, falling back to the legend.
/// Finally, controls added during the edit stop being marked as new.
pub fn reconcile(
    doc: &mut Document,
    store: &mut TransactionStore,
    node: NodeId,
    id: &str,
    form: &FormState,
    accepted: &Accepted,
) -> Result<TransactionRecord> {
    let annotations = match accepted.annotations() {
        Some(echo) => {
            trace!("Using the annotations echoed by the server for '{id}'");
            echo.clone().normalized()
        }
        None => form.annotations(),
    };
    let record = store.apply(id, annotations)?.clone();

    let form_styles: HashMap<&str, Option<&str>> = form
        .categories
        .iter()
        .map(|(name, style)| (name.as_str(), style.as_deref()))
        .collect();
    let mut styles: HashMap<String, Option<String>> = HashMap::new();
    {
        let registry = CategoryRegistry::new(doc)
            .inspect_err(|e| debug!("Category tags of '{id}' fall back to no style: {e:#}"))
            .ok();
        for name in &record.categories {
            let style = match form_styles.get(name.as_str()) {
                Some(Some(style)) => Some(style.to_string()),
                _ => registry.as_ref().and_then(|r| match r.lookup(name) {
                    Ok(definition) => definition.style,
                    Err(e) => {
                        debug!("Category '{name}' of '{id}' is rendered without a style: {e:#}");
                        None
                    }
                }),
            };
            styles.insert(name.clone(), style);
        }
    }

    render_annotations(doc, node, &record.annotations(), |name| {
        styles.get(name).cloned().flatten()
    })?;

    if let Some(modal) = doc.by_id(TRANSACTION_OPTIONS) {
        let added = doc.select(modal, |e| e.has_class(CATEGORY) && e.has_class(NEW));
        for label in added {
            doc.remove_class(label, NEW);
        }
    }
    debug!("Reconciled transaction '{id}'");
    Ok(record)
}
