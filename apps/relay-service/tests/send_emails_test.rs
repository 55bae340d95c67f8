//! # 一斉送信エンドポイントのテスト
//!
//! `build_app` で組み立てたルーターに multipart リクエストを送り、
//! 検証・送信・添付ファイルの削除までを通しで確認する。
//!
//! 送信はモック（`MockMailClientFactory`）、バッチ間の待機は既定で `NoDelay`、
//! 添付の保存先は一時ディレクトリを使う。

use std::{sync::Arc, time::Duration};

use axum::{Router, body::Body};
use http::{Request, StatusCode, header};
use mailrelay_domain::{
    delay::{DelayStrategy, FixedDelay, NoDelay},
    recipient::BatchSize,
};
use mailrelay_infra::{attachment::AttachmentStore, mock::MockMailClientFactory};
use mailrelay_relay_service::{
    app_builder::build_app,
    handler::SendEmailsState,
    usecase::{BatchDispatcher, TemplateRenderer},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "mailrelay-test-boundary";
const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

/// テスト用のアプリケーション一式
struct TestApp {
    app:        Router,
    factory:    MockMailClientFactory,
    upload_dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::build(Arc::new(NoDelay), TemplateRenderer::new().unwrap())
    }

    /// バッチ間の待機戦略を差し替える
    fn with_delay(delay: Arc<dyn DelayStrategy>) -> Self {
        Self::build(delay, TemplateRenderer::new().unwrap())
    }

    /// 本文テンプレートを差し替える
    fn with_renderer(renderer: TemplateRenderer) -> Self {
        Self::build(Arc::new(NoDelay), renderer)
    }

    fn build(delay: Arc<dyn DelayStrategy>, renderer: TemplateRenderer) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let factory = MockMailClientFactory::new();
        let state = Arc::new(SendEmailsState {
            attachments:        AttachmentStore::new(upload_dir.path()),
            mail_clients:       Arc::new(factory.clone()),
            dispatcher:         BatchDispatcher::new(delay),
            renderer,
            default_batch_size: BatchSize::default(),
        });

        Self {
            app: build_app(state, 25 * 1024 * 1024),
            factory,
            upload_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// uploads ディレクトリに残っているファイル数
    fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// multipart/form-data ボディのビルダー
#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    /// 必須項目と添付 PDF をすべて含むフォーム
    fn valid() -> Self {
        Self::default()
            .text("senderEmail", "me@example.com")
            .text("appPassword", "abcd efgh ijkl mnop")
            .text("emails", "a@example.com, b@example.com ,c@example.com")
            .text("name", "Jeanne Martin")
            .text("phoneNumber", "+33 6 12 34 56 78")
            .text("website", "https://jeanne.example.com")
            .text("degree", "Candidature Master 2")
            .text("customMessage", "<p>Bonjour {name},</p>")
            .file("resume", "cv.pdf", "application/pdf", PDF_BYTES)
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn into_request(mut self) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/send-emails")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

fn sorted(values: &Value) -> Vec<String> {
    let mut list: Vec<String> = values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    list.sort();
    list
}

#[tokio::test]
async fn test_全宛先に送信し集計を返す() {
    let app = TestApp::new();

    let (status, body) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["sent"], 3);
    assert_eq!(body["failed"], 0);
    assert_eq!(
        sorted(&body["sentEmails"]),
        vec!["a@example.com", "b@example.com", "c@example.com"]
    );
}

#[tokio::test]
async fn test_送信内容は全宛先で共通() {
    let app = TestApp::new();

    app.send(Form::valid().into_request()).await;

    let sent = app.factory.sender().sent();
    assert_eq!(sent.len(), 3);
    for mail in &sent {
        assert_eq!(mail.from, "me@example.com");
        assert_eq!(mail.message.subject, "Candidature Master 2");
        assert!(mail.message.html_body.contains("<p>Bonjour Jeanne Martin,</p>"));
        assert!(mail.message.html_body.contains("Cordialement,<br>"));
        assert!(mail.message.html_body.contains("+33 6 12 34 56 78"));
        assert_eq!(mail.message.attachment.original_name(), "cv.pdf");
        assert_eq!(mail.message, sent[0].message);
    }
    let credentials = app.factory.requested_credentials();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].app_password(), "abcd efgh ijkl mnop");
}

#[tokio::test]
async fn test_送信後に添付ファイルを削除する() {
    let app = TestApp::new();

    let (status, _) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_全件失敗しても200で集計を返し添付を削除する() {
    let app = TestApp::new();
    app.factory.sender().fail_all();

    let (status, body) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 3, "sent": 0, "failed": 3, "sentEmails": [] })
    );
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_1件の失敗はfailedにのみ現れる() {
    let app = TestApp::new();
    app.factory.sender().fail_for("b@example.com");

    let (status, body) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(
        sorted(&body["sentEmails"]),
        vec!["a@example.com", "c@example.com"]
    );
}

#[tokio::test]
async fn test_batch_size_指定時も全宛先に送信する() {
    let app = TestApp::new();
    let request = Form::valid()
        .text("emails", "a@example.com,b@example.com,c@example.com,d@example.com,e@example.com")
        .text("batchSize", "2")
        .into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["sent"], 5);
}

#[tokio::test]
async fn test_宛先が空白とカンマだけなら0件の集計を返す() {
    let app = TestApp::new();
    let request = Form::valid().text("emails", " , ,").into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 0, "sent": 0, "failed": 0, "sentEmails": [] })
    );
    assert_eq!(app.staged_files(), 0);
}

#[rstest]
#[case("senderEmail")]
#[case("appPassword")]
#[case("emails")]
#[tokio::test]
async fn test_必須項目が欠けていれば400で送信しない(#[case] missing: &str) {
    let app = TestApp::new();
    let mut form = Form::default();
    for (name, value) in [
        ("senderEmail", "me@example.com"),
        ("appPassword", "secret"),
        ("emails", "a@example.com"),
    ] {
        if name != missing {
            form = form.text(name, value);
        }
    }
    let request = form
        .file("resume", "cv.pdf", "application/pdf", PDF_BYTES)
        .into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required fields" }));
    assert!(app.factory.sender().attempts().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_添付が無ければ400で送信しない() {
    let app = TestApp::new();
    let request = Form::default()
        .text("senderEmail", "me@example.com")
        .text("appPassword", "secret")
        .text("emails", "a@example.com")
        .into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Resume PDF is required" }));
    assert!(app.factory.sender().attempts().is_empty());
}

#[tokio::test]
async fn test_pdf以外の添付は400で保存も送信もしない() {
    let app = TestApp::new();
    let request = Form::default()
        .text("senderEmail", "me@example.com")
        .text("appPassword", "secret")
        .text("emails", "a@example.com")
        .file("resume", "photo.png", "image/png", b"\x89PNG")
        .into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Only PDF files are allowed" }));
    assert!(app.factory.sender().attempts().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[rstest]
#[case("0")]
#[case("-5")]
#[case("seventy")]
#[tokio::test]
async fn test_不正なbatch_sizeは400(#[case] batch_size: &str) {
    let app = TestApp::new();
    let request = Form::valid().text("batchSize", batch_size).into_request();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("batchSize"));
    assert!(app.factory.sender().attempts().is_empty());
}

#[tokio::test]
async fn test_クライアント構築に失敗すると500で添付を削除する() {
    let app = TestApp::new();
    app.factory.fail_setup("relay unreachable");

    let (status, body) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send emails");
    assert!(body["details"].as_str().unwrap().contains("relay unreachable"));
    assert!(app.factory.sender().attempts().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_本文の生成に失敗すると500で送信せず添付を削除する() {
    let renderer = TemplateRenderer::from_source("{{ unknown_value }}").unwrap();
    let app = TestApp::with_renderer(renderer);

    let (status, body) = app.send(Form::valid().into_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send emails");
    assert!(body["details"].as_str().unwrap().contains("unknown_value"));
    assert!(app.factory.sender().attempts().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_表示値はプレースホルダと署名の両方でエスケープされる() {
    let app = TestApp::new();
    let request = Form::valid().text("name", "A & B").into_request();

    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    let sent = app.factory.sender().sent();
    let html = &sent[0].message.html_body;
    assert!(html.contains("<p>Bonjour A &amp; B,</p>"));
    assert!(html.contains("A &amp; B <br>"));
}

#[tokio::test(start_paused = true)]
async fn test_呼び出し元が切断すると次のバッチ以降を送信せず添付を削除する() {
    let app = TestApp::with_delay(Arc::new(FixedDelay(Duration::from_secs(600))));
    let request = Form::valid().text("batchSize", "1").into_request();

    // 1 バッチ目の送信後、バッチ間の待機中に呼び出し元が切断する
    let response =
        tokio::time::timeout(Duration::from_secs(30), app.app.clone().oneshot(request)).await;
    assert!(response.is_err());
    assert_eq!(app.factory.sender().attempts().len(), 1);

    // 待機が明けても 2 バッチ目は送信されない
    tokio::time::sleep(Duration::from_secs(1200)).await;

    assert_eq!(app.factory.sender().attempts().len(), 1);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_multipartでないボディは400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/send-emails")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"senderEmail":"me@example.com"}"#))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_ヘルスチェックはhealthyを返す() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_レスポンスにx_request_idヘッダーが含まれる() {
    let app = TestApp::new();

    let response = app
        .app
        .clone()
        .oneshot(Form::valid().into_request())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-provided-request-id-123")
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "client-provided-request-id-123"
    );
}

#[tokio::test]
async fn test_任意のオリジンからのリクエストを許可する() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://client.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
