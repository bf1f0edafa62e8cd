//! Shared types used by the sink client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while forwarding records to the sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid sink URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("Sink request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Sink responded with an unexpected status code.
    #[error("Unexpected sink response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the sink.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Provider-assigned acknowledgement metadata for one appended record.
///
/// Opaque to the pipeline; it is collected and returned upward unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkAck {
    /// Shard the record was routed to.
    pub shard_id: String,
    /// Sequence number assigned within the shard.
    pub sequence_number: String,
}
