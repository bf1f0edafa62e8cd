//! HTTP client for the key-value configuration store.

use crate::config::get_config;
use crate::http::{USER_AGENT, format_endpoint, normalize_base_url};
use crate::questions::types::{ItemResponse, Question, QuestionStoreError};
use reqwest::{Client, Method, StatusCode};

/// Lightweight HTTP client for question-set lookups.
pub struct QuestionStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) log_raw: bool,
}

impl QuestionStore {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, QuestionStoreError> {
        let config = get_config();
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        let base_url =
            normalize_base_url(&config.config_store_url).map_err(QuestionStoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %config
                .config_store_api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized configuration store client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.config_store_api_key.clone(),
            log_raw: config.log_raw_responses,
        })
    }

    /// Fetch the question-set stored under `key` in `table`.
    ///
    /// Returns the stored item's question list in its stored order. The raw store
    /// response is only logged when raw-response logging is enabled in configuration.
    pub async fn fetch_question_set(
        &self,
        table: &str,
        key: &str,
    ) -> Result<Vec<Question>, QuestionStoreError> {
        let response = self
            .request(Method::GET, &format!("tables/{table}/items/{key}"))?
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                if self.log_raw {
                    tracing::debug!(table, key, raw = %body, "Configuration store response");
                }
                let parsed: ItemResponse = serde_json::from_str(&body)
                    .map_err(|_| QuestionStoreError::MalformedItem(key.to_string()))?;
                let questions = parsed
                    .item
                    .questions
                    .ok_or_else(|| QuestionStoreError::MalformedItem(key.to_string()))?;
                tracing::info!(table, key, questions = questions.len(), "Question-set loaded");
                Ok(questions)
            }
            StatusCode::NOT_FOUND => {
                let error = QuestionStoreError::NotFound {
                    table: table.to_string(),
                    key: key.to_string(),
                };
                tracing::error!(table, key, error = %error, "Question-set lookup failed");
                Err(error)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QuestionStoreError::UnexpectedStatus { status, body };
                tracing::error!(table, key, error = %error, "Configuration store request failed");
                Err(error)
            }
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, QuestionStoreError> {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        Ok(req)
    }
}
