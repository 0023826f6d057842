//! Update-expression builder.
//!
//! A [`Patch`] converts a flat field/value map into a generic attribute
//! update. Fields the patch does not name are left untouched when the
//! patch is applied to a stored document.

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{Document, StoreError};

/// A single attribute operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// Set the field to the given value, creating it if absent.
    Set(Value),
    /// Remove the field entirely.
    Remove,
    /// Append values to a list field, creating the list if absent.
    Append(Vec<Value>),
}

/// An update expression over one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: BTreeMap<String, PatchOp>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.insert(field.into(), PatchOp::Set(value.into()));
        self
    }

    /// Remove `field`.
    pub fn remove(mut self, field: impl Into<String>) -> Self {
        self.ops.insert(field.into(), PatchOp::Remove);
        self
    }

    /// Append `values` to the list held in `field`.
    pub fn append(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.ops.insert(field.into(), PatchOp::Append(values));
        self
    }

    /// Returns true if the patch carries no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Fields named by this patch.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Apply the patch to a document in place.
    ///
    /// Appending to a field that holds a non-list value is an error;
    /// appending to an absent field creates the list.
    pub fn apply(&self, doc: &mut Document) -> Result<(), StoreError> {
        for (field, op) in &self.ops {
            match op {
                PatchOp::Set(value) => {
                    doc.insert(field.clone(), value.clone());
                }
                PatchOp::Remove => {
                    doc.remove(field);
                }
                PatchOp::Append(values) => match doc.get_mut(field) {
                    None => {
                        doc.insert(field.clone(), Value::Array(values.clone()));
                    }
                    Some(Value::Array(list)) => {
                        list.extend(values.iter().cloned());
                    }
                    Some(_) => {
                        return Err(StoreError::InvalidPatch(format!(
                            "cannot append to non-list field '{}'",
                            field
                        )));
                    }
                },
            }
        }
        Ok(())
    }
}
