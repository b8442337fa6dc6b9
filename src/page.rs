//! The page: the rendered element tree together with the store it is projected from and the
//! editor that acts on it.

use crate::dom::{Document, NodeId};
use crate::editor::{EditSession, Editor, Prompt};
use crate::filter::{self, FilterOutcome};
use crate::model::{
    AmountStyle, FilterCriterion, Legend, TransactionEntry, TransactionRecord, TransactionStore,
};
use crate::submit::Submitter;
use crate::summary::{summarize, CategorySummary};
use crate::view::{render_page, PageSource, TRANSACTION};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The transactions a page is rendered from, as the server provides them.
///
/// ```json
/// { "transactions": [ { "id": "t1", "date": "2024-03-02", "label": "Bakery Paul",
///   "amount": "-42.10", "categories": ["Food"], "goal": null } ] }
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<TransactionEntry>,
}

impl Snapshot {
    pub async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .context("Unable to load the transactions snapshot")
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize snapshot")?;
        utils::write(path, data).await
    }
}

/// A rendered page.
#[derive(Debug)]
pub struct Page {
    doc: Document,
    store: TransactionStore,
    legend: Legend,
    style: AmountStyle,
    editor: Editor,
}

impl Page {
    /// Builds the store from `snapshot` and renders the page with the settings of `config`.
    ///
    /// # Errors
    /// - Returns an error if two transactions share an id.
    pub fn new(snapshot: Snapshot, config: &Config) -> Result<Self> {
        let style = config.amount_style().clone();
        let mut store = TransactionStore::new();
        for entry in snapshot.transactions {
            store.insert(entry.into_record(&style))?;
        }
        let doc = render_page(&PageSource {
            store: &store,
            legend: config.legend(),
            goals: config.goals(),
            action_base: config.action_base(),
            page_size: config.page_size(),
        })?;
        debug!("Rendered a page of {} transactions", store.len());
        Ok(Self {
            doc,
            store,
            legend: config.legend().clone(),
            style,
            editor: Editor::new(),
        })
    }

    /// Loads the snapshot configured in `config` and renders it.
    pub async fn load(config: &Config) -> Result<Self> {
        let snapshot = Snapshot::load(config.snapshot_path()).await?;
        Self::new(snapshot, config)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// The rendered node of transaction `id`.
    pub fn node(&self, id: &str) -> Result<NodeId> {
        self.doc
            .select_first(self.doc.root(), |e| {
                e.is("li") && e.has_class(TRANSACTION) && e.attr("data-tx-id") == Some(id)
            })
            .with_context(|| format!("The page has no transaction '{id}'"))
    }

    /// The stored record of transaction `id`.
    pub fn record(&self, id: &str) -> Result<&TransactionRecord> {
        self.store
            .get(id)
            .with_context(|| format!("Transaction '{id}' not found"))
    }

    /// Opens the editor on transaction `id`.
    pub fn open(&mut self, id: &str) -> Result<&EditSession> {
        let node = self.node(id)?;
        self.open_node(node)
    }

    /// Opens the editor on the transaction containing `node`, e.g. a clicked category tag.
    pub fn open_node(&mut self, node: NodeId) -> Result<&EditSession> {
        self.editor.open(&mut self.doc, node)
    }

    pub fn add_category(&mut self, prompt: &mut impl Prompt) -> Result<Option<NodeId>> {
        self.editor.add_category(&mut self.doc, prompt)
    }

    pub fn set_category(&mut self, name: &str, checked: bool) -> Result<()> {
        self.editor.set_category(&mut self.doc, name, checked)
    }

    pub fn select_goal(&mut self, goal: Option<&str>) -> Result<()> {
        self.editor.select_goal(&mut self.doc, goal)
    }

    /// Submits the open editor and reconciles the page with the result.
    pub async fn submit(&mut self, submitter: &(dyn Submitter + Send + Sync)) -> Result<()> {
        self.editor
            .submit(&mut self.doc, &mut self.store, submitter)
            .await
    }

    pub fn close(&mut self) {
        self.editor.close(&mut self.doc)
    }

    pub fn cancel(&mut self) -> Option<EditSession> {
        self.editor.cancel(&mut self.doc)
    }

    /// Keyword suggestions for the transaction being edited.
    pub fn suggestions(&self) -> Result<Vec<String>> {
        self.editor.suggestions(&self.legend)
    }

    pub fn apply_filter(&mut self, criterion: &FilterCriterion) -> Result<FilterOutcome> {
        filter::apply_filter(&mut self.doc, criterion)
    }

    pub fn clear_filter(&mut self) -> Result<()> {
        filter::clear_filter(&mut self.doc)
    }

    /// Expense totals per category over the stored records.
    pub fn summary(&self) -> Vec<CategorySummary> {
        summarize(self.store.iter(), &self.legend, &self.style)
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html(self.doc.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::submit::TestSubmitter;
    use crate::test::{fixture_config, fixture_page, TestEnv};

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut snapshot = crate::test::fixture_snapshot();
        let first = snapshot.transactions[0].clone();
        snapshot.transactions.push(first);
        assert!(Page::new(snapshot, &fixture_config()).is_err());
    }

    #[test]
    fn test_unknown_transaction() {
        let mut page = fixture_page(100);
        assert!(page.node("nope").is_err());
        assert!(page.record("nope").is_err());
        assert!(page.open("nope").is_err());
    }

    #[tokio::test]
    async fn test_load_from_home() {
        let env = TestEnv::new().await;
        let page = Page::load(&env.config()).await.unwrap();
        assert_eq!(page.store().len(), 5);
        assert_eq!(page.record("t1").unwrap().label, "Bakery Paul");
    }

    #[tokio::test]
    async fn test_nodes_agree_with_store_after_edits() {
        let mut page = fixture_page(2);
        let submitter = TestSubmitter::default();
        for (id, category) in [("t2", "Food"), ("t4", "Rent"), ("t5", "Transport")] {
            let _ = page.open(id).unwrap();
            page.set_category(category, true).unwrap();
            page.submit(&submitter).await.unwrap();
        }
        for stored in page.store().iter() {
            let node = page.node(&stored.id).unwrap();
            assert_eq!(&extract(page.document(), node).unwrap(), stored);
        }
    }

    #[tokio::test]
    async fn test_snapshot_save_and_load() {
        let env = TestEnv::new().await;
        let path = env.config().root().join("copy.json");
        let snapshot = crate::test::fixture_snapshot();
        snapshot.save(&path).await.unwrap();
        assert_eq!(Snapshot::load(&path).await.unwrap(), snapshot);
    }
}
