//! Streaming ingestion sink integration.

mod client;
mod types;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use client::{HttpSink, PROCESSED_TIME_FIELD};
pub use types::{SinkAck, SinkError};

/// Interface implemented by streaming sink backends.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Stamp the record with a processing timestamp, append it to `stream`, and
    /// return the provider-assigned acknowledgement.
    ///
    /// Ownership of the record transfers to the sink; the stamped field is the only
    /// enrichment applied before serialization.
    async fn put_record(
        &self,
        stream: &str,
        record: Map<String, Value>,
    ) -> Result<SinkAck, SinkError>;
}
