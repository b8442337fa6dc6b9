//! Resolves category titles and styles from the rendered legend.

use crate::dom::{Document, NodeId};
use crate::model::{CategoryDefinition, UNCATEGORIZED};
use crate::view::{CATEGORIES_BAR, LEGEND_ENTRY};
use crate::Result;
use anyhow::Context;

/// Read access to the `#categories-bar` legend of a page.
pub struct CategoryRegistry<'a> {
    doc: &'a Document,
    bar: NodeId,
}

impl<'a> CategoryRegistry<'a> {
    /// # Errors
    /// - Returns an error if the page has no legend.
    pub fn new(doc: &'a Document) -> Result<Self> {
        let bar = doc.require_id(CATEGORIES_BAR)?;
        Ok(Self { doc, bar })
    }

    /// Looks up category `name`. The empty name is the uncategorized entry.
    ///
    /// # Errors
    /// - Returns an error if the legend has no entry for `name`. Every category in use is expected
    ///   to be in the legend, so this indicates a configuration problem.
    pub fn lookup(&self, name: &str) -> Result<CategoryDefinition> {
        let key = if name.is_empty() { UNCATEGORIZED } else { name };
        let entry = self
            .doc
            .get(self.bar)
            .children()
            .iter()
            .copied()
            .find(|n| {
                let e = self.doc.get(*n);
                e.has_class(LEGEND_ENTRY) && e.attr("data-name") == Some(key)
            })
            .with_context(|| format!("The category legend has no entry for '{key}'"))?;
        let element = self.doc.get(entry);
        Ok(CategoryDefinition {
            name: name.to_string(),
            title: element.attr("title").unwrap_or(key).to_string(),
            style: element.attr("style").map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixture_page;

    #[test]
    fn test_lookup_configured_category() {
        let page = fixture_page(100);
        let registry = CategoryRegistry::new(page.document()).unwrap();
        let food = registry.lookup("Food").unwrap();
        assert_eq!(food.title, "Groceries & Restaurants");
        assert_eq!(food.style.as_deref(), Some("background-color: #f4a261"));
        let transport = registry.lookup("Transport").unwrap();
        assert_eq!(transport.title, "Transport");
        assert_eq!(transport.style, None);
    }

    #[test]
    fn test_lookup_uncategorized() {
        let page = fixture_page(100);
        let registry = CategoryRegistry::new(page.document()).unwrap();
        let definition = registry.lookup("").unwrap();
        assert_eq!(definition.name, "");
        assert_eq!(definition.title, UNCATEGORIZED);
    }

    #[test]
    fn test_lookup_missing_is_an_error() {
        let page = fixture_page(100);
        let registry = CategoryRegistry::new(page.document()).unwrap();
        // Used by a transaction, but not part of the legend.
        let err = registry.lookup("Gifts").unwrap_err();
        assert!(err.to_string().contains("no entry for 'Gifts'"));
    }

    #[test]
    fn test_no_legend() {
        let doc = Document::new();
        assert!(CategoryRegistry::new(&doc).is_err());
    }
}
