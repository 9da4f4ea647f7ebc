//! Most-recent-first history of generated invoices.
//!
//! Writes are read-modify-write cycles over one stored list with no
//! versioning. Exclusive `&mut self` access keeps a single process
//! consistent; two processes sharing the same medium can lose updates.

use chrono::{DateTime, Duration, Utc};
use log::{error, warn};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::HistoryRecord;
use crate::store::KeyValueStore;

/// Key under which the whole history list is stored.
pub const STORAGE_KEY: &str = "invoice-generator-invoices";

/// `save` / `list` / `delete` over any [`KeyValueStore`].
///
/// Storage failures never reach the caller: reads degrade to an
/// empty history and writes are dropped, both with a log entry.
pub struct HistoryRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HistoryRepository<S> {
    pub fn new(store: S) -> Self {
        HistoryRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Prepend a record and persist the whole list.
    pub fn save(&mut self, record: HistoryRecord) {
        let mut records = self.list();
        records.insert(0, record);
        if let Err(e) = self.persist(&records) {
            error!("Error saving invoice history: {}", e);
        }
    }

    /// All records, newest first. Empty if nothing is stored or the
    /// stored value cannot be read.
    pub fn list(&self) -> Vec<HistoryRecord> {
        match self.load() {
            Ok(records) => records,
            Err(e) => {
                warn!("Error retrieving invoice history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<HistoryRecord> {
        self.list().into_iter().find(|record| record.id == id)
    }

    /// Remove the record with this id. Unknown ids change nothing.
    pub fn delete(&mut self, id: &str) {
        let mut records = self.list();
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return;
        }
        if let Err(e) = self.persist(&records) {
            error!("Error deleting invoice {} from history: {}", id, e);
        }
    }

    /// Store three demonstration records (without documents) when the
    /// history is empty. Returns whether anything was added.
    pub fn seed_samples_if_empty(&mut self, now: DateTime<Utc>) -> bool {
        if !self.list().is_empty() {
            return false;
        }
        for record in sample_records(now) {
            self.save(record);
        }
        true
    }

    fn load(&self) -> Result<Vec<HistoryRecord>> {
        match self.store.get_item(STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&mut self, records: &[HistoryRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.store.set_item(STORAGE_KEY, &json)
    }
}

/// Demo entries dated one, two and three weeks before `now`, in save order.
pub fn sample_records(now: DateTime<Utc>) -> Vec<HistoryRecord> {
    let sample = |id: &str, client: &str, total: Decimal, weeks: i64| HistoryRecord {
        id: id.to_string(),
        client_name: client.to_string(),
        total,
        date: now - Duration::weeks(weeks),
        document_bytes: Vec::new(),
    };
    vec![
        sample("INV-2024001", "Acme Corporation", Decimal::new(245000, 2), 1),
        sample("INV-2024002", "Tech Solutions Ltd", Decimal::new(187550, 2), 2),
        sample("INV-2024003", "Creative Agency Inc", Decimal::new(320075, 2), 3),
    ]
}
