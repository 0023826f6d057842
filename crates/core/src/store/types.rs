//! Types for the document store accessor.

use serde_json::Value;

/// A stored document: a flat attribute map.
pub type Document = serde_json::Map<String, Value>;

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Document body could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A patch operation cannot be applied to the stored value.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

/// Filter for scans: matches documents whose `field` equals any of the
/// listed values. A missing field never matches.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    /// Field to compare.
    pub field: String,
    /// Accepted values.
    pub any_of: Vec<Value>,
}

impl ScanFilter {
    /// Match documents where `field` equals `value`.
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            any_of: vec![value.into()],
        }
    }

    /// Match documents where `field` equals any of `values`.
    pub fn field_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            any_of: values,
        }
    }

    /// Returns true if the document passes the filter.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field)
            .map(|v| self.any_of.iter().any(|accepted| accepted == v))
            .unwrap_or(false)
    }
}

/// Equality guard for conditional updates.
#[derive(Debug, Clone)]
pub struct Condition {
    /// Field to compare.
    pub field: String,
    /// Required current value.
    pub equals: Value,
}

impl Condition {
    /// Require that `field` currently equals `value`.
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }

    /// Returns true if the document satisfies the condition.
    pub fn holds(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.equals)
    }
}

/// One page of scan results.
///
/// `next_token` is a continuation token for the following page; `None`
/// means the scan is exhausted. Filters are applied to the page after it
/// is read, so a page may hold fewer than `limit` items while more pages
/// remain.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Matching documents in this page.
    pub items: Vec<Document>,
    /// Token to resume the scan, if more rows exist.
    pub next_token: Option<u64>,
}
