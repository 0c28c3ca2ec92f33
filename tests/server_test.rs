use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use honyaku_assist::core::models::GOOGLE_ENGINE;
use honyaku_assist::server::api::{router, AppState};
use honyaku_assist::{AssistConfig, HonyakuAssistant, MemoryUsageStore, UsageStore, UsageTracker};

fn app(store: Arc<MemoryUsageStore>) -> Router {
    let assistant =
        HonyakuAssistant::new(AssistConfig::default(), UsageTracker::new(store)).unwrap();
    router(AppState::new(assistant).unwrap())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_form(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn input_page_exists_at_root() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _) = send(app(Arc::new(MemoryUsageStore::new())), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn input_page_title_and_navbar() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, html) = send(app(Arc::new(MemoryUsageStore::new())), request).await;

    assert!(html.contains("<title>Honyaku Assist</title>"));
    assert!(html.contains("<a class=\"navbar-brand\" href=\"/\">Honyaku Assist</a>"));
    assert!(html.contains("<span class=\"navbar-text\">A machine translation assistant for"));
}

#[tokio::test]
async fn input_page_form_content() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, html) = send(app(Arc::new(MemoryUsageStore::new())), request).await;

    assert!(html.contains("Japanese to English"));
    assert!(html.contains("English to Japanese"));
    assert!(html.contains("Translate</button>"));
}

#[tokio::test]
async fn valid_post_renders_both_results() {
    let store = Arc::new(MemoryUsageStore::new());
    let (status, html) = send(
        app(store.clone()),
        post_form("direction=Ja%3EEn&source_text=%E3%81%8A%E3%81%AF%E3%82%88%E3%81%86"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("おはよう"));
    assert!(html.contains("(DeepL authentication error: auth_key must not be empty)"));
    assert!(html.contains("(Error: Configuration error: GOOGLE_PROJECT_CREDENTIALS is not set)"));
    assert!(html.contains("ja &rarr; en-us, 4 characters"));

    // A failed Google call isn't counted
    assert!(store.load(GOOGLE_ENGINE).await.unwrap().is_none());
}

#[tokio::test]
async fn blank_text_redisplays_form_with_error() {
    let (status, html) = send(
        app(Arc::new(MemoryUsageStore::new())),
        post_form("direction=En%3EJa&source_text=++"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("This field is required."));
    assert!(html.contains("Translate</button>"));
    assert!(html.contains(" checked"));
}

#[tokio::test]
async fn missing_fields_redisplay_form() {
    let (status, html) = send(app(Arc::new(MemoryUsageStore::new())), post_form("")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches("This field is required.").count(), 2);
}

#[tokio::test]
async fn health_check() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(Arc::new(MemoryUsageStore::new())), request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "honyaku-assist");
}
