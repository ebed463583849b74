use tracing::info;

use crate::error::QaBotError;
use crate::record::{AnswerRecord, CorrelationId};

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Key-value table holding worker results, keyed by correlation id.
pub trait ResultStore {
    fn get_item(&self, item_id: &str) -> Result<Option<AnswerRecord>, String>;

    fn put_item(&self, record: &AnswerRecord) -> Result<(), String>;

    fn delete_item(&self, item_id: &str) -> Result<(), String>;

    /// One unordered scan page of at most `limit` records.
    fn scan(&self, limit: usize) -> Result<Vec<AnswerRecord>, String>;

    /// Keys of every record in the table, across all scan pages.
    fn scan_item_ids(&self) -> Result<Vec<String>, String>;
}

/// Point lookup; `None` means the worker has not written (or never wrote) the row.
pub fn fetch<S: ResultStore + ?Sized>(
    store: &S,
    correlation_id: &CorrelationId,
) -> Result<Option<AnswerRecord>, QaBotError> {
    let item_id = correlation_id.as_str();
    store.get_item(item_id).map_err(QaBotError::Store)
}

pub fn list_recent<S: ResultStore + ?Sized>(
    store: &S,
    limit: usize,
) -> Result<Vec<AnswerRecord>, QaBotError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    store.scan(limit).map_err(QaBotError::Store)
}

/// Deletes every record in the table and returns how many were removed.
pub fn clear_all<S: ResultStore + ?Sized>(store: &S) -> Result<usize, QaBotError> {
    let item_ids = store.scan_item_ids().map_err(QaBotError::Store)?;
    for item_id in &item_ids {
        store.delete_item(item_id).map_err(QaBotError::Store)?;
    }
    info!(deleted = item_ids.len(), "cleared result table");
    Ok(item_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_record, InMemoryResultStore};

    #[test]
    fn fetch_misses_unknown_id() {
        let store = InMemoryResultStore::default();
        let found = fetch(&store, &CorrelationId::generate()).expect("lookup succeeds");
        assert!(found.is_none());
    }

    #[test]
    fn fetch_returns_record_written_by_worker() {
        let store = InMemoryResultStore::default();
        let id = CorrelationId::generate();
        let record = sample_record(id.as_str());
        store.put_item(&record).expect("put succeeds");

        assert_eq!(fetch(&store, &id).expect("lookup succeeds"), Some(record));
    }

    #[test]
    fn list_recent_is_bounded_by_limit() {
        let store = InMemoryResultStore::default();
        for index in 0..7 {
            store
                .put_item(&sample_record(&format!("item-{index}")))
                .expect("put succeeds");
        }

        assert_eq!(list_recent(&store, 3).expect("scan").len(), 3);
        assert_eq!(list_recent(&store, 50).expect("scan").len(), 7);
        assert!(list_recent(&store, 0).expect("scan").is_empty());
    }

    #[test]
    fn clear_all_removes_more_rows_than_one_scan_page() {
        let store = InMemoryResultStore::with_page_size(2);
        for index in 0..5 {
            store
                .put_item(&sample_record(&format!("item-{index}")))
                .expect("put succeeds");
        }

        assert_eq!(clear_all(&store).expect("clear succeeds"), 5);
        for limit in [1, 10, 1_000] {
            assert!(list_recent(&store, limit).expect("scan").is_empty());
        }
    }

    #[test]
    fn clear_all_on_empty_table_deletes_nothing() {
        let store = InMemoryResultStore::default();
        assert_eq!(clear_all(&store).expect("clear succeeds"), 0);
    }

    #[test]
    fn store_failure_maps_to_store_error() {
        let store = InMemoryResultStore::default().failing("ResourceNotFoundException");
        let error = list_recent(&store, 5).expect_err("scan fails");
        match error {
            QaBotError::Store(message) => assert_eq!(message, "ResourceNotFoundException"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
