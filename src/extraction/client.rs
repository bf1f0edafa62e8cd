//! HTTP client for the document extraction capability.
//!
//! One analysis request covers the whole document with every query attached and
//! asynchronous handling requested; the client then polls the analysis until the
//! provider reports a terminal state. No timeout is imposed here — call deadlines
//! are the provider's responsibility.

use crate::config::get_config;
use crate::extraction::DocumentExtractor;
use crate::extraction::answers::collect_answers;
use crate::extraction::types::{
    AnalysisPage, AnalysisStatus, AnalysisStatusResponse, ExtractionError, StartAnalysisResponse,
};
use crate::http::{USER_AGENT, format_endpoint, normalize_base_url};
use crate::questions::Question;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Extraction backend speaking the capability's analysis REST interface.
pub struct HttpExtractor {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) poll_interval: Duration,
}

impl HttpExtractor {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, ExtractionError> {
        let config = get_config();
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let base_url =
            normalize_base_url(&config.extractor_url).map_err(ExtractionError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            poll_interval_ms = config.extractor_poll_interval_ms,
            "Initialized extractor client"
        );

        Ok(Self {
            client,
            base_url,
            poll_interval: Duration::from_millis(config.extractor_poll_interval_ms),
        })
    }

    async fn start_analysis(
        &self,
        document_uri: &str,
        questions: &[Question],
    ) -> Result<String, ExtractionError> {
        let body = json!({
            "document": document_uri,
            "queries": questions,
            "features": ["QUERIES"],
            "async": true,
        });

        let response = self
            .request(Method::POST, "analyses")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ExtractionError::UnexpectedStatus { status, body };
            tracing::error!(document = document_uri, error = %error, "Analysis submission failed");
            return Err(error);
        }

        let body = response.text().await?;
        let parsed: StartAnalysisResponse = serde_json::from_str(&body)
            .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;
        tracing::debug!(
            document = document_uri,
            analysis = %parsed.analysis_id,
            queries = questions.len(),
            "Analysis submitted"
        );
        Ok(parsed.analysis_id)
    }

    async fn await_analysis(&self, analysis_id: &str) -> Result<Vec<AnalysisPage>, ExtractionError> {
        loop {
            let response = self
                .request(Method::GET, &format!("analyses/{analysis_id}"))
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = ExtractionError::UnexpectedStatus { status, body };
                tracing::error!(analysis = analysis_id, error = %error, "Analysis poll failed");
                return Err(error);
            }

            let body = response.text().await?;
            let parsed: AnalysisStatusResponse = serde_json::from_str(&body)
                .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;

            match parsed.status {
                AnalysisStatus::Succeeded => return Ok(parsed.pages),
                AnalysisStatus::Failed => {
                    let error = ExtractionError::AnalysisFailed {
                        reason: parsed
                            .error
                            .unwrap_or_else(|| "no reason reported".to_string()),
                    };
                    tracing::error!(analysis = analysis_id, error = %error, "Analysis failed");
                    return Err(error);
                }
                AnalysisStatus::Queued | AnalysisStatus::Running => {
                    tracing::trace!(analysis = analysis_id, "Analysis still in progress");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client.request(method, url)
    }
}

#[async_trait]
impl DocumentExtractor for HttpExtractor {
    async fn extract_answers(
        &self,
        document_uri: &str,
        questions: &[Question],
    ) -> Result<Map<String, Value>, ExtractionError> {
        if questions.is_empty() {
            tracing::debug!(
                document = document_uri,
                "Empty question-set; skipping extraction call"
            );
            return Ok(Map::new());
        }

        let analysis_id = self.start_analysis(document_uri, questions).await?;
        let pages = self.await_analysis(&analysis_id).await?;
        let mapping = collect_answers(&pages);
        tracing::info!(
            document = document_uri,
            pages = pages.len(),
            answers = mapping.len(),
            "Analysis completed"
        );
        Ok(mapping)
    }
}
