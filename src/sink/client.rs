//! HTTP client for the streaming ingestion sink.

use crate::config::get_config;
use crate::http::{USER_AGENT, format_endpoint, normalize_base_url};
use crate::sink::RecordSink;
use crate::sink::types::{SinkAck, SinkError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use time::OffsetDateTime;

/// Field stamped onto every record immediately before serialization.
pub const PROCESSED_TIME_FIELD: &str = "processedTime";

/// Sink backend speaking the stream append REST interface.
pub struct HttpSink {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl HttpSink {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, SinkError> {
        let config = get_config();
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let base_url = normalize_base_url(&config.sink_url).map_err(SinkError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized sink client");

        Ok(Self { client, base_url })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client.request(method, url)
    }
}

#[async_trait]
impl RecordSink for HttpSink {
    async fn put_record(
        &self,
        stream: &str,
        mut record: Map<String, Value>,
    ) -> Result<SinkAck, SinkError> {
        stamp_processed_time(&mut record);

        let response = self
            .request(Method::POST, &format!("streams/{stream}/records"))
            .json(&json!({ "record": record }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SinkError::UnexpectedStatus { status, body };
            tracing::error!(stream, error = %error, "Sink write failed");
            return Err(error);
        }

        let ack: SinkAck = response.json().await?;
        tracing::debug!(
            stream,
            shard = %ack.shard_id,
            sequence = %ack.sequence_number,
            "Record appended"
        );
        Ok(ack)
    }
}

/// Insert the processing timestamp into the record.
///
/// Exactly one `processedTime` field is present afterwards; no other field is
/// touched.
pub(crate) fn stamp_processed_time(record: &mut Map<String, Value>) {
    record.insert(
        PROCESSED_TIME_FIELD.to_string(),
        Value::String(current_timestamp_rfc3339()),
    );
}

/// Current timestamp formatted for record enrichment.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
