//! Shared types used by the configuration store client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while reading question-sets from the configuration store.
#[derive(Debug, Error)]
pub enum QuestionStoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid configuration store URL: {0}")]
    InvalidUrl(String),
    /// No item exists for the configured lookup key.
    #[error("No question-set found for key '{key}' in table '{table}'")]
    NotFound {
        /// Table that was queried.
        table: String,
        /// Lookup key that had no item.
        key: String,
    },
    /// HTTP layer failed before receiving a response.
    #[error("Configuration store request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Store responded with an unexpected status code.
    #[error("Unexpected configuration store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Item exists but does not carry a well-formed question-set.
    #[error("Malformed question-set item for key '{0}'")]
    MalformedItem(String),
}

/// One thing to extract from a document: a prompt and the alias its answer is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    /// Prompt text submitted to the extraction capability.
    pub text: String,
    /// Alias the extracted answer is keyed by in the result mapping.
    pub alias: String,
}

#[derive(Deserialize)]
pub(crate) struct ItemResponse {
    pub(crate) item: StoredItem,
}

#[derive(Deserialize)]
pub(crate) struct StoredItem {
    #[serde(default)]
    pub(crate) questions: Option<Vec<Question>>,
}
