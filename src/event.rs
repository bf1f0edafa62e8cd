//! Inbound storage notification events.
//!
//! Each event carries an ordered list of object records naming a storage bucket and
//! object key. Records are processed strictly in the order they appear.

use serde::Deserialize;

/// Notification event delivered when objects land in storage.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    /// Object records in arrival order.
    #[serde(default)]
    pub records: Vec<ObjectRecord>,
}

/// A single object reference within a notification event.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRecord {
    /// Storage bucket holding the object.
    pub bucket: String,
    /// Key of the object within the bucket.
    pub key: String,
}

impl StorageEvent {
    /// Resolve the event into document references, preserving order.
    pub fn references(&self) -> Vec<DocumentRef> {
        self.records
            .iter()
            .map(|record| DocumentRef {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
            })
            .collect()
    }
}

/// A (bucket, key) pair identifying one document in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Storage bucket holding the document.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl DocumentRef {
    /// Canonical reference string handed to the extraction capability.
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
