use crate::model::{Annotations, TransactionRecord};
use crate::Result;
use anyhow::{bail, Context};
use std::collections::HashMap;

/// The client-side model of the page: every transaction record keyed by id, in list order.
///
/// The rendered page is a projection of this store. Confirmed edits are applied here first and
/// then re-projected onto the page.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TransactionStore {
    order: Vec<String>,
    records: HashMap<String, TransactionRecord>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// - Returns an error if a record with the same id is already stored.
    pub fn insert(&mut self, record: TransactionRecord) -> Result<()> {
        if self.records.contains_key(&record.id) {
            bail!("Duplicate transaction id '{}'", record.id);
        }
        self.order.push(record.id.clone());
        let _ = self.records.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.get(id)
    }

    /// Replaces the annotations of transaction `id`. The list order is untouched.
    pub fn apply(&mut self, id: &str, annotations: Annotations) -> Result<&TransactionRecord> {
        let record = self
            .records
            .get_mut(id)
            .with_context(|| format!("Transaction '{id}' is not in the store"))?;
        record.annotate(annotations);
        Ok(record)
    }

    /// Records in list order.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AmountStyle, TransactionEntry};

    fn record(id: &str) -> TransactionRecord {
        TransactionEntry {
            id: id.to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            label: id.to_uppercase(),
            amount: Default::default(),
            categories: vec![],
            goal: None,
        }
        .into_record(&AmountStyle::default())
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut store = TransactionStore::new();
        for id in ["c", "a", "b"] {
            store.insert(record(id)).unwrap();
        }
        let ids: Vec<&str> = store.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_duplicate_id() {
        let mut store = TransactionStore::new();
        store.insert(record("a")).unwrap();
        assert!(store.insert(record("a")).is_err());
    }

    #[test]
    fn test_apply() {
        let mut store = TransactionStore::new();
        store.insert(record("a")).unwrap();
        store.insert(record("b")).unwrap();
        let annotations = Annotations {
            categories: vec!["Food".to_string()],
            goal: Some("Vacation".to_string()),
        };
        let updated = store.apply("a", annotations.clone()).unwrap();
        assert_eq!(updated.annotations(), annotations);
        assert_eq!(store.iter().next().unwrap().id, "a");
        assert!(store.apply("zzz", Annotations::default()).is_err());
    }
}
