//! Storage trait for document store backends.

use serde_json::Value;

use super::patch::Patch;
use super::types::{Condition, Document, Page, ScanFilter, StoreError};

/// Trait for document store backends.
///
/// Implementations are keyed by `(table, key)` where `table` is a logical
/// collection name. `query` and `scan` return empty collections, never an
/// error, when nothing matches.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if absent.
    fn get(&self, table: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Store a document, replacing any existing one under the same key.
    fn put(&self, table: &str, key: &str, doc: Document) -> Result<(), StoreError>;

    /// Apply a patch to a document, creating it from the patch's set
    /// operations if it does not exist. Fields the patch does not name are
    /// never overwritten.
    fn update(&self, table: &str, key: &str, patch: Patch) -> Result<(), StoreError>;

    /// Apply a patch only if `condition` holds against the current
    /// document. Returns `false` without writing when the document is
    /// absent or the condition does not hold.
    fn update_if(
        &self,
        table: &str,
        key: &str,
        patch: Patch,
        condition: &Condition,
    ) -> Result<bool, StoreError>;

    /// Delete a document. Deleting an absent document is a no-op.
    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError>;

    /// All documents in `table` whose `field` equals `value`.
    fn query(&self, table: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError>;

    /// One page of documents from `table`, optionally filtered, starting
    /// after the continuation token `start`.
    fn scan(
        &self,
        table: &str,
        filter: Option<&ScanFilter>,
        start: Option<u64>,
        limit: usize,
    ) -> Result<Page, StoreError>;

    /// Follow scan continuation tokens, collecting matches until the scan
    /// is exhausted or `max_pages` pages have been read. The cap bounds
    /// runaway scans; callers choose it.
    fn query_all(
        &self,
        table: &str,
        filter: Option<&ScanFilter>,
        page_size: usize,
        max_pages: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut items = Vec::new();
        let mut token = None;
        for _ in 0..max_pages {
            let page = self.scan(table, filter, token, page_size)?;
            items.extend(page.items);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(items)
    }
}
