//! Extraction-and-forwarding pipeline orchestration.
//!
//! One invocation handles one storage event: for each object reference, in event
//! order, the pipeline looks up the deployment's question-set, asks the extraction
//! capability to answer it against the document, and forwards the flattened answers
//! to the sink. The first failing step aborts the remaining references; records
//! already forwarded stay sunk.

use crate::config::get_config;
use crate::event::StorageEvent;
use crate::extraction::{DocumentExtractor, ExtractionError, HttpExtractor};
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use crate::questions::{QuestionStore, QuestionStoreError};
use crate::sink::{HttpSink, RecordSink, SinkAck, SinkError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

/// Errors emitted by the extraction pipeline.
///
/// All variants are terminal for the current invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Question-set lookup failed.
    #[error("Failed to load question-set: {0}")]
    Questions(#[from] QuestionStoreError),
    /// Extraction capability invocation failed.
    #[error("Failed to extract answers: {0}")]
    Extraction(#[from] ExtractionError),
    /// Sink write failed.
    #[error("Failed to forward record: {0}")]
    Sink(#[from] SinkError),
}

/// Deployment-fixed lookup and destination names applied on every pass.
#[derive(Debug, Clone)]
pub struct PipelineTargets {
    /// Configuration table holding the question-set item.
    pub questions_table: String,
    /// Lookup key of the question-set item.
    pub questions_key: String,
    /// Destination stream records are appended to.
    pub sink_stream: String,
}

impl PipelineTargets {
    /// Read the target names from loaded configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self {
            questions_table: config.questions_table.clone(),
            questions_key: config.questions_key.clone(),
            sink_stream: config.sink_stream.clone(),
        }
    }
}

/// Coordinates the full pipeline: question lookup, answer extraction, and sink writes.
///
/// The service owns long-lived handles to the configuration store, the extraction
/// capability, and the sink so every invocation reuses the same clients. Construct
/// it once near process start and share it through an `Arc`.
pub struct PipelineService {
    questions: QuestionStore,
    extractor: Box<dyn DocumentExtractor>,
    sink: Box<dyn RecordSink>,
    targets: PipelineTargets,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Process one storage event and return the ordered sink acknowledgements.
    async fn process_event(&self, event: StorageEvent) -> Result<Vec<SinkAck>, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build the pipeline from environment-derived configuration.
    ///
    /// Collaborator clients are established eagerly; a malformed collaborator URL is
    /// a startup-fatal condition.
    pub fn new() -> Self {
        let questions =
            QuestionStore::new().expect("Failed to initialize configuration store client");
        let extractor = HttpExtractor::new().expect("Failed to initialize extractor client");
        let sink = HttpSink::new().expect("Failed to initialize sink client");
        Self::with_parts(
            questions,
            Box::new(extractor),
            Box::new(sink),
            PipelineTargets::from_config(),
        )
    }

    /// Assemble a pipeline from explicit collaborator handles.
    pub fn with_parts(
        questions: QuestionStore,
        extractor: Box<dyn DocumentExtractor>,
        sink: Box<dyn RecordSink>,
        targets: PipelineTargets,
    ) -> Self {
        Self {
            questions,
            extractor,
            sink,
            targets,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    async fn run(&self, event: StorageEvent) -> Result<Vec<SinkAck>, PipelineError> {
        let references = event.references();
        tracing::info!(records = references.len(), "Processing storage event");

        let mut acks = Vec::with_capacity(references.len());
        for reference in &references {
            let questions = self
                .questions
                .fetch_question_set(&self.targets.questions_table, &self.targets.questions_key)
                .await?;
            let uri = reference.uri();
            let answers = self.extractor.extract_answers(&uri, &questions).await?;
            let ack = self
                .sink
                .put_record(&self.targets.sink_stream, answers)
                .await?;
            tracing::info!(document = %uri, shard = %ack.shard_id, "Record forwarded");
            acks.push(ack);
        }

        self.metrics.record_event(acks.len() as u64);
        Ok(acks)
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn process_event(&self, event: StorageEvent) -> Result<Vec<SinkAck>, PipelineError> {
        let invocation = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %invocation);
        self.run(event).instrument(span).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Question;
    use httpmock::{Method::GET, MockServer};
    use reqwest::Client;
    use serde_json::{Map, Value, json};
    use std::sync::Mutex;

    fn store_for(server: &MockServer) -> QuestionStore {
        QuestionStore {
            client: Client::builder()
                .user_agent("docrelay-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key: None,
            log_raw: false,
        }
    }

    fn targets() -> PipelineTargets {
        PipelineTargets {
            questions_table: "survey-questions".into(),
            questions_key: "survey".into(),
            sink_stream: "survey-stream".into(),
        }
    }

    fn event(records: &[(&str, &str)]) -> StorageEvent {
        serde_json::from_value(json!({
            "records": records
                .iter()
                .map(|(bucket, key)| json!({ "bucket": bucket, "key": key }))
                .collect::<Vec<_>>()
        }))
        .expect("event parses")
    }

    fn answers(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(alias, text)| ((*alias).to_string(), Value::String((*text).to_string())))
            .collect()
    }

    async fn mock_question_set(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tables/survey-questions/items/survey");
                then.status(200).json_body(json!({
                    "item": {
                        "id": "survey",
                        "questions": [{ "text": "Q1", "alias": "A1" }]
                    }
                }));
            })
            .await
    }

    struct FakeExtractor {
        answers: Map<String, Value>,
        fail_for: Option<String>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl DocumentExtractor for FakeExtractor {
        async fn extract_answers(
            &self,
            document_uri: &str,
            _questions: &[Question],
        ) -> Result<Map<String, Value>, ExtractionError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(document_uri.to_string());
            if self.fail_for.as_deref() == Some(document_uri) {
                return Err(ExtractionError::AnalysisFailed {
                    reason: "scripted failure".into(),
                });
            }
            Ok(self.answers.clone())
        }
    }

    struct RecordingSink {
        records: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    }

    #[async_trait]
    impl RecordSink for RecordingSink {
        async fn put_record(
            &self,
            stream: &str,
            record: Map<String, Value>,
        ) -> Result<SinkAck, SinkError> {
            let mut guard = self.records.lock().expect("records lock");
            guard.push((stream.to_string(), record));
            Ok(SinkAck {
                shard_id: "shard-1".into(),
                sequence_number: guard.len().to_string(),
            })
        }
    }

    struct Harness {
        service: PipelineService,
        extractor_calls: Arc<Mutex<Vec<String>>>,
        sink_records: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    }

    fn harness(
        server: &MockServer,
        extractor_answers: Map<String, Value>,
        fail_for: Option<&str>,
    ) -> Harness {
        let extractor_calls = Arc::new(Mutex::new(Vec::new()));
        let sink_records = Arc::new(Mutex::new(Vec::new()));
        let service = PipelineService::with_parts(
            store_for(server),
            Box::new(FakeExtractor {
                answers: extractor_answers,
                fail_for: fail_for.map(str::to_string),
                calls: Arc::clone(&extractor_calls),
            }),
            Box::new(RecordingSink {
                records: Arc::clone(&sink_records),
            }),
            targets(),
        );
        Harness {
            service,
            extractor_calls,
            sink_records,
        }
    }

    #[tokio::test]
    async fn single_reference_flows_through_to_the_sink() {
        let server = MockServer::start_async().await;
        mock_question_set(&server).await;
        let harness = harness(&server, answers(&[("A1", "Yes")]), None);

        let acks = harness
            .service
            .process_event(event(&[("b", "k")]))
            .await
            .expect("event succeeds");

        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].shard_id, "shard-1");

        let calls = harness.extractor_calls.lock().expect("calls lock");
        assert_eq!(calls.as_slice(), ["s3://b/k"]);

        let records = harness.sink_records.lock().expect("records lock");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "survey-stream");
        assert_eq!(records[0].1["A1"], "Yes");

        let snapshot = harness.service.metrics_snapshot();
        assert_eq!(snapshot.events_processed, 1);
        assert_eq!(snapshot.records_forwarded, 1);
    }

    #[tokio::test]
    async fn missing_question_set_aborts_before_extraction() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tables/survey-questions/items/survey");
                then.status(404);
            })
            .await;
        let harness = harness(&server, answers(&[]), None);

        let error = harness
            .service
            .process_event(event(&[("b", "k")]))
            .await
            .expect_err("missing key fails");

        assert!(matches!(
            error,
            PipelineError::Questions(QuestionStoreError::NotFound { .. })
        ));
        assert!(harness.extractor_calls.lock().expect("calls lock").is_empty());
        assert!(harness.sink_records.lock().expect("records lock").is_empty());
    }

    #[tokio::test]
    async fn failed_extraction_aborts_before_the_sink() {
        let server = MockServer::start_async().await;
        mock_question_set(&server).await;
        let harness = harness(&server, answers(&[]), Some("s3://b/k"));

        let error = harness
            .service
            .process_event(event(&[("b", "k")]))
            .await
            .expect_err("extraction failure propagates");

        assert!(matches!(error, PipelineError::Extraction(_)));
        assert!(harness.sink_records.lock().expect("records lock").is_empty());
    }

    #[tokio::test]
    async fn failure_midway_leaves_earlier_records_sunk_and_returns_no_acks() {
        let server = MockServer::start_async().await;
        mock_question_set(&server).await;
        let harness = harness(&server, answers(&[("A1", "Yes")]), Some("s3://b/second"));

        let error = harness
            .service
            .process_event(event(&[("b", "first"), ("b", "second")]))
            .await
            .expect_err("second reference fails the invocation");

        assert!(matches!(error, PipelineError::Extraction(_)));

        // The first record was already forwarded and stays sunk.
        let records = harness.sink_records.lock().expect("records lock");
        assert_eq!(records.len(), 1);

        let calls = harness.extractor_calls.lock().expect("calls lock");
        assert_eq!(calls.as_slice(), ["s3://b/first", "s3://b/second"]);

        let snapshot = harness.service.metrics_snapshot();
        assert_eq!(snapshot.events_processed, 0);
        assert_eq!(snapshot.records_forwarded, 0);
    }

    #[tokio::test]
    async fn empty_event_completes_without_collaborator_calls() {
        let server = MockServer::start_async().await;
        let lookup = mock_question_set(&server).await;
        let harness = harness(&server, answers(&[]), None);

        let acks = harness
            .service
            .process_event(event(&[]))
            .await
            .expect("empty event succeeds");

        assert!(acks.is_empty());
        assert_eq!(lookup.hits_async().await, 0);
        assert!(harness.extractor_calls.lock().expect("calls lock").is_empty());

        let snapshot = harness.service.metrics_snapshot();
        assert_eq!(snapshot.events_processed, 1);
        assert_eq!(snapshot.records_forwarded, 0);
    }
}
