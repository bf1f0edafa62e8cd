//! Document extraction capability integration.
//!
//! The capability answers a list of (prompt, alias) queries against one document and
//! returns located answers page by page. The pipeline treats the whole exchange as a
//! single blocking call.

mod answers;
mod client;
mod types;

use crate::questions::Question;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use client::HttpExtractor;
pub use types::{AnalysisPage, ExtractionError, QueryAnswer};

/// Interface implemented by document extraction backends.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Answer every question against the referenced document and return a flat
    /// alias → answer mapping.
    ///
    /// An empty question-set yields an empty mapping without invoking the backend.
    /// When two questions share an alias, the answer encountered last in
    /// page-then-answer order wins.
    async fn extract_answers(
        &self,
        document_uri: &str,
        questions: &[Question],
    ) -> Result<Map<String, Value>, ExtractionError>;
}
