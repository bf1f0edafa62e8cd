//! Shared types used by the extraction client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while invoking the extraction capability.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid extractor URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("Extraction request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Capability responded with an unexpected status code.
    #[error("Unexpected extractor response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the capability.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Analysis reached a terminal failed state on the provider side.
    #[error("Document analysis failed: {reason}")]
    AnalysisFailed {
        /// Failure reason reported by the capability.
        reason: String,
    },
    /// Response could not be mapped to the expected page/answer shape.
    #[error("Malformed extractor response: {0}")]
    MalformedResponse(String),
}

/// One page of a completed analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisPage {
    /// Answer tuples located on this page, in reading order.
    #[serde(default)]
    pub answers: Vec<QueryAnswer>,
}

/// A single located answer tuple.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    /// Identifier the capability assigned to the originating query.
    pub query_id: String,
    /// Alias from the originating question definition.
    pub alias: String,
    /// Extracted answer text.
    pub text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartAnalysisResponse {
    pub(crate) analysis_id: String,
}

#[derive(Deserialize)]
pub(crate) struct AnalysisStatusResponse {
    pub(crate) status: AnalysisStatus,
    #[serde(default)]
    pub(crate) pages: Vec<AnalysisPage>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AnalysisStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}
