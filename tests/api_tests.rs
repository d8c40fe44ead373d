use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mediashelf::config::Config;
use mediashelf::services::{MailError, Mailer};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use tower::ServiceExt;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mailer fake that records every delivery instead of touching SMTP.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, u32)>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, recipient: &str, code: u32) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), code));
        Ok(())
    }
}

/// Mailer fake that always fails, standing in for a dead relay.
struct FailingMailer;

#[async_trait::async_trait]
impl Mailer for FailingMailer {
    async fn send_otp(&self, _recipient: &str, _code: u32) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

fn test_config() -> Config {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let uploads = std::env::temp_dir().join(format!(
        "mediashelf-api-test-{}-{id}",
        std::process::id()
    ));

    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.uploads_path = uploads.to_string_lossy().into_owned();
    config
}

async fn spawn_app() -> (Router, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());

    let state = mediashelf::api::create_app_state_with_mailer(test_config(), mailer.clone())
        .await
        .expect("Failed to create app state");

    (mediashelf::api::router(state), mailer)
}

async fn spawn_app_with_failing_mailer() -> Router {
    let state =
        mediashelf::api::create_app_state_with_mailer(test_config(), Arc::new(FailingMailer))
            .await
            .expect("Failed to create app state");

    mediashelf::api::router(state)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// OTP
// ============================================================================

#[tokio::test]
async fn test_send_otp_requires_email() {
    let (app, mailer) = spawn_app().await;

    let response = app
        .oneshot(json_request("/send-otp", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_otp_emails_a_six_digit_code() {
    let (app, mailer) = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "/send-otp",
            serde_json::json!({"email": "user@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "OTP sent successfully");

    let otp = body["otp"].as_u64().unwrap();
    assert!((100_000..=999_999).contains(&otp));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "user@example.com");
    assert_eq!(u64::from(sent[0].1), otp);
}

#[tokio::test]
async fn test_send_otp_transport_failure_is_a_server_error() {
    let app = spawn_app_with_failing_mailer().await;

    let response = app
        .oneshot(json_request(
            "/send-otp",
            serde_json::json!({"email": "user@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The issued code must not leak to the caller on failure.
    let body = json_body(response).await;
    assert!(body.get("otp").is_none());
}

#[tokio::test]
async fn test_verify_otp_accepts_matching_codes() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "/verify-otp",
            serde_json::json!({"enteredOtp": "123456", "generatedOtp": "123456"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OTP verified successfully");
}

#[tokio::test]
async fn test_verify_otp_compares_number_and_string_forms_equal() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "/verify-otp",
            serde_json::json!({"enteredOtp": "123456", "generatedOtp": 123_456}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verify_otp_rejects_mismatch_and_missing_codes() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/verify-otp",
            serde_json::json!({"enteredOtp": "123456", "generatedOtp": "654321"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request("/verify-otp", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Registration & Login
// ============================================================================

async fn register(app: &Router, username: &str, email: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "/Newuser",
            serde_json::json!({
                "username": username,
                "password": "hunter2-hunter2",
                "email": email,
                "phoneNumber": "555-0100"
            }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_requires_all_fields() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "/Newuser",
            serde_json::json!({"username": "alice", "email": "alice@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_returns_identity_without_password() {
    let (app, _) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["phoneNumber"], "555-0100");

    // The hash must never be serialized.
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_username_or_email() {
    let (app, _) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same username, different email.
    let response = register(&app, "alice", "other@example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same email, different username.
    let response = register(&app, "bob", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Only the first registration can log in; no second row was made.
    let response = app
        .oneshot(json_request(
            "/login",
            serde_json::json!({"email": "alice@example.com", "password": "hunter2-hunter2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_login_with_unknown_email_fails() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "/login",
            serde_json::json!({"email": "ghost@example.com", "password": "whatever"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "User does not exist");
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let (app, _) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "/login",
            serde_json::json!({"email": "alice@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid password");
}

#[tokio::test]
async fn test_login_returns_minimal_identity() {
    let (app, _) = spawn_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "/login",
            serde_json::json!({"email": "alice@example.com", "password": "hunter2-hunter2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "Success");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());
}

// ============================================================================
// Item catalog
// ============================================================================

const BOUNDARY: &str = "mediashelf-test-boundary";

fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                let mime = mime_of(filename);
                body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("{}; boundary={BOUNDARY}", mime::MULTIPART_FORM_DATA),
        )
        .body(Body::from(body))
        .unwrap()
}

fn mime_of(filename: &str) -> &'static str {
    if filename.ends_with(".png") {
        "image/png"
    } else if filename.ends_with(".mp4") {
        "video/mp4"
    } else {
        "application/octet-stream"
    }
}

async fn create_item(app: &Router, text: &str, category: &str) -> axum::response::Response {
    app.clone()
        .oneshot(multipart_request(
            "/NewItem",
            &[
                ("text", None, text.as_bytes()),
                ("category", None, category.as_bytes()),
                ("file", Some("upload.png"), b"\x89PNG fake image bytes"),
            ],
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_item_requires_text_category_and_file() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/NewItem",
            &[("text", None, b"lonely text")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(multipart_request(
            "/NewItem",
            &[
                ("text", None, b"a meme"),
                ("category", None, b"memes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_item_rejects_non_media_files() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(multipart_request(
            "/NewItem",
            &[
                ("text", None, b"a document"),
                ("category", None, b"docs"),
                ("file", Some("notes.txt"), b"plain text"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_item_rejects_duplicate_text_across_categories() {
    let (app, _) = spawn_app().await;

    let response = create_item(&app, "the same text", "memes").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_item(&app, "the same text", "wallpapers").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_returns_whole_category_without_search() {
    let (app, _) = spawn_app().await;

    assert_eq!(
        create_item(&app, "first meme", "memes").await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        create_item(&app, "second meme", "memes").await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        create_item(&app, "a wallpaper", "wallpapers").await.status(),
        StatusCode::CREATED
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ItemData/memes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["text"], "first meme");
    assert_eq!(items[1]["text"], "second meme");
}

#[tokio::test]
async fn test_query_filters_case_insensitively() {
    let (app, _) = spawn_app().await;

    assert_eq!(
        create_item(&app, "a search term", "memes").await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        create_item(&app, "unrelated", "memes").await.status(),
        StatusCode::CREATED
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ItemData/memes?search=Search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "a search term");
}

#[tokio::test]
async fn test_query_empty_result_is_not_found() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ItemData/nothing-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploaded_file_is_served_back() {
    let (app, _) = spawn_app().await;

    assert_eq!(
        create_item(&app, "served meme", "memes").await.status(),
        StatusCode::CREATED
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ItemData/memes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    let file = body["items"][0]["file"].as_str().unwrap().to_string();
    assert!(file.starts_with("uploads/"));
    assert!(file.ends_with(".png"));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{file}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"\x89PNG fake image bytes");
}

#[tokio::test]
async fn test_unknown_upload_is_not_found() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/uploads/no-such-file.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_first_file_of_many_is_kept() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/NewItem",
            &[
                ("text", None, b"multi upload"),
                ("category", None, b"memes"),
                ("file", Some("first.png"), b"first bytes"),
                ("file", Some("second.png"), b"second bytes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ItemData/memes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    let file = body["items"][0]["file"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{file}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"first bytes");
}
