//! Integration tests: drive a `Session` against a mocked Gemini endpoint.
//!
//! Every test starts its own `wiremock::MockServer` and points the client at
//! it through `ClientConfig::base_url`, so no network access or API key is
//! needed.

use edgequake_briefly::{
    render_export, validate, BrieflyError, ClientConfig, ExtractionTemplate, GeminiClient,
    Session, SessionProgressCallback, Stage, SummaryLength, TextStats, UploadedFile,
    MAX_FILE_BYTES,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const ENDPOINT: &str = "/models/gemini-1.5-flash-latest:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    let config = ClientConfig::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build()
        .unwrap();
    GeminiClient::new(config).unwrap()
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

async fn mount_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .respond_with(reply(text))
        .mount(server)
        .await;
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

fn pdf_of_size(size: usize) -> UploadedFile {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(size, b' ');
    UploadedFile::from_bytes("report.pdf", "application/pdf", bytes)
}

fn png() -> UploadedFile {
    UploadedFile::from_bytes("scan.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn pdf_is_extracted_with_pdf_prompt() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hello world").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(pdf_of_size(2 * 1024 * 1024)).unwrap();
    assert!(session.state().error().is_none());

    let text = session.extract(&client).await.unwrap();
    assert_eq!(text, "Hello world");
    assert!(!session.state().is_extracting());
    assert_eq!(
        session.state().text_stats(),
        Some(TextStats {
            characters: 11,
            words: 2
        })
    );

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let parts = &bodies[0]["contents"][0]["parts"];
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Extract all text from this PDF document"));
    assert_eq!(parts[1]["inline_data"]["mime_type"], "application/pdf");
    assert!(parts[1]["inline_data"]["data"]
        .as_str()
        .unwrap()
        .starts_with("JVBERi0xLjQK"));

    let cfg = &bodies[0]["generationConfig"];
    assert_eq!(cfg["temperature"], 0.1);
    assert_eq!(cfg["topK"], 1);
    assert_eq!(cfg["topP"], 1.0);
    assert_eq!(cfg["maxOutputTokens"], 8192);
}

#[tokio::test]
async fn image_uses_ocr_prompt() {
    let server = MockServer::start().await;
    mount_reply(&server, "Receipt total 12.50").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    session.extract(&client).await.unwrap();

    let bodies = request_bodies(&server).await;
    let parts = &bodies[0]["contents"][0]["parts"];
    assert!(parts[0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Extract all text from this image"));
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
}

#[tokio::test]
async fn whitespace_only_extraction_is_an_empty_document() {
    let server = MockServer::start().await;
    mount_reply(&server, "   ").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();

    let err = session.extract(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::EmptyDocument));
    let s = session.state();
    assert!(s.error().unwrap().contains("No text found"));
    assert!(s.extracted_text().is_none());
    assert!(!s.is_extracting());
}

#[tokio::test]
async fn missing_candidates_count_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    let err = session.extract(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::EmptyDocument));
}

#[tokio::test]
async fn path_backed_file_is_read_at_extraction() {
    let server = MockServer::start().await;
    mount_reply(&server, "Scanned page").await;
    let client = client_for(&server);

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("page.tiff");
    std::fs::write(&file_path, b"II*\0").unwrap();

    let file = UploadedFile::from_path(&file_path, None).await.unwrap();
    assert_eq!(file.mime_type, "image/tiff");

    let mut session = Session::new();
    session.select_file(file).unwrap();
    session.extract(&client).await.unwrap();

    let bodies = request_bodies(&server).await;
    assert_eq!(
        bodies[0]["contents"][0]["parts"][1]["inline_data"]["data"],
        "SUkqAA=="
    );
}

// ── Summarisation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn short_summary_caps_tokens_and_prompt() {
    let server = MockServer::start().await;
    mount_reply(&server, "A short summary.").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(pdf_of_size(64)).unwrap();
    session.extract(&client).await.unwrap();
    session.set_length(SummaryLength::Short);

    let summary = session.summarize(&client).await.unwrap();
    assert_eq!(summary, "A short summary.");

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let body = &bodies[1];
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
    assert_eq!(body["generationConfig"]["temperature"], 0.3);
    assert_eq!(body["generationConfig"]["topK"], 40);
    assert_eq!(body["generationConfig"]["topP"], 0.95);

    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("short summary"));
    assert!(prompt.contains("2-3 sentences"));
    assert!(prompt.ends_with("Document Content:\nA short summary.\n\nSummary:"));
    assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn each_length_maps_to_its_token_cap() {
    for (length, cap) in [
        (SummaryLength::Short, 200),
        (SummaryLength::Medium, 500),
        (SummaryLength::Long, 1000),
    ] {
        let server = MockServer::start().await;
        mount_reply(&server, "text").await;
        let client = client_for(&server);

        let summary = edgequake_briefly::summarize_text(&client, "Some document.", length)
            .await
            .unwrap();
        assert_eq!(summary, "text");

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[0]["generationConfig"]["maxOutputTokens"], cap, "{length}");
    }
}

#[tokio::test]
async fn summarize_before_extraction_makes_no_request() {
    let server = MockServer::start().await;
    mount_reply(&server, "unused").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    let err = session.summarize(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::MissingInput));
    assert_eq!(session.state().error(), Some("Please extract text first"));
    assert!(request_bodies(&server).await.is_empty());
}

// ── API errors ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn api_error_message_is_surfaced_by_both_operations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": {"message": "invalid key"}})),
        )
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    let err = session.extract(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::ExtractionFailed { .. }));
    assert_eq!(session.state().error(), Some("invalid key"));
    assert!(!session.state().is_extracting());

    let err = edgequake_briefly::summarize_text(&client, "text", SummaryLength::Medium)
        .await
        .unwrap_err();
    assert!(matches!(err, BrieflyError::SummarizationFailed { .. }));
    assert_eq!(err.to_string(), "invalid key");
}

#[tokio::test]
async fn error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let pdf_err = edgequake_briefly::extract_text(&client, &pdf_of_size(32))
        .await
        .unwrap_err();
    assert_eq!(pdf_err.to_string(), "PDF text extraction failed");

    let ocr_err = edgequake_briefly::extract_text(&client, &png())
        .await
        .unwrap_err();
    assert_eq!(ocr_err.to_string(), "OCR processing failed");

    let sum_err = edgequake_briefly::summarize_text(&client, "text", SummaryLength::Long)
        .await
        .unwrap_err();
    assert_eq!(sum_err.to_string(), "Summary generation failed");
}

fn unreachable_client() -> GeminiClient {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::builder()
        .api_key("secret-key-123")
        .base_url(format!("http://127.0.0.1:{port}"))
        .build()
        .unwrap();
    GeminiClient::new(config).unwrap()
}

#[tokio::test]
async fn unreachable_endpoint_fails_both_operations_without_leaking_key() {
    let client = unreachable_client();

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    let err = session.extract(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::ExtractionFailed { .. }));
    let message = session.state().error().unwrap();
    assert!(message.starts_with("OCR processing failed: "), "{message}");
    assert!(!message.contains("secret-key-123"), "{message}");
    assert!(!session.state().is_extracting());

    let err = edgequake_briefly::summarize_text(&client, "text", SummaryLength::Short)
        .await
        .unwrap_err();
    assert!(matches!(err, BrieflyError::SummarizationFailed { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Summary generation failed: "), "{message}");
    assert!(!message.contains("secret-key-123"), "{message}");
}

#[tokio::test]
async fn unreachable_endpoint_releases_summary_busy_flag() {
    let client = unreachable_client();

    let mut session = Session::new();
    session.select_file(pdf_of_size(16)).unwrap();
    let job = session.begin_extraction().unwrap();
    session
        .finish_extraction(job, Ok("Some text".into()))
        .unwrap();

    let err = session.summarize(&client).await.unwrap_err();
    assert!(matches!(err, BrieflyError::SummarizationFailed { .. }));
    let s = session.state();
    assert!(!s.is_summarizing());
    assert!(s.summary().is_none());
    assert!(!s.error().unwrap().contains("secret-key-123"));
}

#[tokio::test]
async fn failed_summary_keeps_previous_one() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(reply("Extracted body"))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    session.extract(&client).await.unwrap();
    session.summarize(&client).await.unwrap();
    assert_eq!(session.state().summary().unwrap().text, "Extracted body");

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": {"message": "quota"}})),
        )
        .mount(&server)
        .await;

    session.set_length(SummaryLength::Long);
    assert!(session.summarize(&client).await.is_err());
    let s = session.state();
    assert_eq!(s.summary().unwrap().text, "Extracted body");
    assert_eq!(s.summary().unwrap().length, SummaryLength::Medium);
    assert_eq!(s.error(), Some("quota"));
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn result_for_replaced_document_is_discarded() {
    let server = MockServer::start().await;
    mount_reply(&server, "old document text").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(pdf_of_size(16)).unwrap();
    let job = session.begin_extraction().unwrap();

    // The user picks another file while the request is in flight.
    let new_id = session.select_file(png()).unwrap();
    let result = job.run(&client).await;
    assert_eq!(result.as_deref().unwrap(), "old document text");

    let err = session.finish_extraction(job, result).unwrap_err();
    assert!(matches!(err, BrieflyError::Superseded));
    let s = session.state();
    assert_eq!(s.file_id(), Some(new_id));
    assert_eq!(s.file().unwrap().name, "scan.png");
    assert!(s.extracted_text().is_none());
    assert!(!s.is_extracting());
}

// ── Export ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn exported_file_has_header_and_length_name() {
    let server = MockServer::start().await;
    mount_reply(&server, "Foo.").await;
    let client = client_for(&server);

    let mut session = Session::new();
    session.select_file(png()).unwrap();
    session.extract(&client).await.unwrap();
    session.summarize(&client).await.unwrap();

    let now = chrono::Local::now();
    let export = session.export(now).unwrap();
    assert_eq!(
        export.filename,
        format!("medium_summary_{}.txt", now.timestamp_millis())
    );
    assert_eq!(export.content.lines().next(), Some("Document Summary (MEDIUM)"));

    session.set_length(SummaryLength::Long);
    let relabelled = session.export(now).unwrap();
    assert_eq!(
        relabelled.filename,
        format!("long_summary_{}.txt", now.timestamp_millis())
    );
    assert!(relabelled.content.starts_with("Document Summary (LONG)\n"));
    assert!(export.content.ends_with("\n\nFoo."));

    let dir = tempfile::tempdir().unwrap();
    let written = export.write_to_dir(dir.path()).await.unwrap();
    assert_eq!(std::fs::read_to_string(written).unwrap(), export.content);
}

#[test]
fn render_export_matches_session_export() {
    let now = chrono::Local::now();
    let export = render_export("Foo.", SummaryLength::Short, now).unwrap();
    assert!(export.filename.starts_with("short_summary_"));
    assert!(export.content.starts_with("Document Summary (SHORT)\nGenerated on: "));
}

// ── Validation ───────────────────────────────────────────────────────────────

#[test]
fn validator_boundaries() {
    for mime in [
        "application/pdf",
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/bmp",
        "image/tiff",
    ] {
        assert!(validate(mime, 0).is_ok(), "{mime}");
        assert!(validate(mime, MAX_FILE_BYTES).is_ok(), "{mime}");
        assert!(validate(mime, MAX_FILE_BYTES + 1).is_err(), "{mime}");
    }
    for mime in ["image/gif", "text/plain", "application/octet-stream", ""] {
        assert!(validate(mime, 1).is_err(), "{mime}");
    }
}

#[test]
fn oversized_file_is_rejected_without_state_change() {
    let mut session = Session::new();
    let mut file = png();
    file.size = MAX_FILE_BYTES + 1;
    let err = session.select_file(file).unwrap_err();
    assert_eq!(err.to_string(), "File size must be less than 50MB");
    assert!(session.state().file().is_none());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl SessionProgressCallback for Recorder {
    fn on_extraction_start(&self, file_name: &str, template: ExtractionTemplate) {
        self.events
            .lock()
            .unwrap()
            .push(format!("extract:{file_name}:{template}"));
    }
    fn on_extraction_complete(&self, stats: TextStats) {
        self.events
            .lock()
            .unwrap()
            .push(format!("extracted:{}", stats.words));
    }
    fn on_summary_start(&self, length: SummaryLength) {
        self.events.lock().unwrap().push(format!("summary:{length}"));
    }
    fn on_summary_complete(&self, length: SummaryLength, chars: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("summarised:{length}:{chars}"));
    }
    fn on_error(&self, stage: Stage, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error:{stage}:{message}"));
    }
}

#[tokio::test]
async fn progress_events_follow_the_session() {
    let server = MockServer::start().await;
    mount_reply(&server, "two words").await;
    let client = client_for(&server);

    let recorder = Arc::new(Recorder::default());
    let mut session = Session::new().with_progress(recorder.clone());
    session.select_file(pdf_of_size(16)).unwrap();
    session.extract(&client).await.unwrap();
    session.set_length(SummaryLength::Long);
    session.summarize(&client).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "extract:report.pdf:PDF extraction",
            "extracted:2",
            "summary:long",
            "summarised:long:9",
        ]
    );
}

#[tokio::test]
async fn progress_reports_errors() {
    let server = MockServer::start().await;
    mount_reply(&server, "").await;
    let client = client_for(&server);

    let recorder = Arc::new(Recorder::default());
    let mut session = Session::new().with_progress(recorder.clone());
    session.select_file(png()).unwrap();
    let _ = session.extract(&client).await;

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "extract:scan.png:OCR",
            "error:extraction:No text found in the document",
        ]
    );
}
