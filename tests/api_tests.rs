//! HTTP API tests
//!
//! Drives the full route table through `actix_web::test` with an in-memory
//! registry.

use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use bytes::Bytes;
use linkpulse::api::services::{ApiSettings, AppHandles, AppStartTime, configure};
use linkpulse::api::types::{CreateShortResponse, HistoryItem};
use linkpulse::errors::{LinkpulseError, Result};
use linkpulse::services::{
    QrRenderer, RandomCodeGenerator, ResolutionService, ResolutionSettings, SvgQrRenderer,
};
use linkpulse::storage::{MemoryRegistry, UrlRecord, UrlRegistry};
use linkpulse::system::event::NotificationBus;
use serde_json::{Value, json};

fn test_settings() -> ApiSettings {
    ApiSettings {
        base_url: "http://sho.rt".to_string(),
        request_timeout: Duration::from_secs(5),
        keepalive: Duration::from_secs(60),
        qr_enabled: true,
    }
}

fn handles_with(
    registry: Arc<dyn UrlRegistry>,
    qr: Arc<dyn QrRenderer>,
    settings: ApiSettings,
) -> AppHandles {
    let service = Arc::new(ResolutionService::new(
        registry,
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(NotificationBus::new(64)),
        ResolutionSettings::default(),
    ));
    AppHandles {
        service,
        qr,
        settings,
        start_time: AppStartTime::now(),
    }
}

fn default_handles() -> AppHandles {
    handles_with(
        Arc::new(MemoryRegistry::new()),
        Arc::new(SvgQrRenderer::default()),
        test_settings(),
    )
}

macro_rules! init_app {
    ($handles:expr) => {{
        let handles = $handles.clone();
        test::init_service(
            App::new()
                .configure(move |cfg: &mut web::ServiceConfig| handles.register(cfg))
                .configure(configure),
        )
        .await
    }};
}

fn create_request(url: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/short")
        .set_json(json!({ "originalUrl": url }))
}

/// 读取流式响应的下一块数据
async fn next_chunk<B>(body: &mut B) -> Option<Bytes>
where
    B: MessageBody + Unpin,
{
    let chunk = tokio::time::timeout(
        Duration::from_secs(2),
        poll_fn(|cx| Pin::new(&mut *body).poll_next(cx)),
    )
    .await
    .expect("timed out waiting for stream chunk")?;
    chunk.ok()
}

/// Sleeps before every lookup
struct SlowRegistry {
    inner: MemoryRegistry,
    delay: Duration,
}

#[async_trait]
impl UrlRegistry for SlowRegistry {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_original_url(url).await
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_short_code(code).await
    }

    async fn insert(&self, record: UrlRecord) -> Result<()> {
        self.inner.insert(record).await
    }

    async fn increment_click(&self, code: &str) -> Result<Option<u64>> {
        self.inner.increment_click(code).await
    }

    async fn list_all(&self) -> Result<Vec<UrlRecord>> {
        self.inner.list_all().await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "slow"
    }
}

/// Storage that is down
struct BrokenRegistry;

#[async_trait]
impl UrlRegistry for BrokenRegistry {
    async fn find_by_original_url(&self, _url: &str) -> Result<Option<UrlRecord>> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    async fn find_by_short_code(&self, _code: &str) -> Result<Option<UrlRecord>> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    async fn insert(&self, _record: UrlRecord) -> Result<()> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    async fn increment_click(&self, _code: &str) -> Result<Option<u64>> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    async fn list_all(&self) -> Result<Vec<UrlRecord>> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    async fn count(&self) -> Result<u64> {
        Err(LinkpulseError::database_connection("connection refused"))
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

struct FailingQr;

impl QrRenderer for FailingQr {
    fn render(&self, _short_url: &str) -> Result<Vec<u8>> {
        Err(LinkpulseError::qr_render("renderer offline"))
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

// =============================================================================
// POST /api/short
// =============================================================================

#[actix_rt::test]
async fn test_create_short_url() {
    let app = init_app!(default_handles());

    let resp = test::call_service(&app, create_request("http://example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Url Generated");
    assert_eq!(body["clickCount"], 0);

    let code = body["shortCode"].as_str().unwrap();
    assert_eq!(code.len(), RandomCodeGenerator::DEFAULT_LENGTH);
    assert_eq!(body["shortUrl"], format!("http://sho.rt/{}", code));
    assert!(
        body["qrCodeImg"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,")
    );
}

#[actix_rt::test]
async fn test_create_existing_url_returns_same_code() {
    let app = init_app!(default_handles());

    let first: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://example.com").to_request()).await;
    let second: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://example.com").to_request()).await;

    assert_eq!(second.message, "Url already exists");
    assert_eq!(second.short_code, first.short_code);
    assert_eq!(second.short_url, first.short_url);
}

#[actix_rt::test]
async fn test_create_without_qr() {
    let settings = ApiSettings {
        qr_enabled: false,
        ..test_settings()
    };
    let handles = handles_with(
        Arc::new(MemoryRegistry::new()),
        Arc::new(SvgQrRenderer::default()),
        settings,
    );
    let app = init_app!(handles);

    let body: Value = test::call_and_read_body_json(&app, create_request("http://a.example").to_request()).await;
    assert!(body.get("qrCodeImg").is_none());
}

#[actix_rt::test]
async fn test_create_rejects_empty_url() {
    let app = init_app!(default_handles());

    for payload in [json!({ "originalUrl": "" }), json!({ "originalUrl": "   " }), json!({})] {
        let req = TestRequest::post()
            .uri("/api/short")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "InvalidInput");
    }
}

#[actix_rt::test]
async fn test_create_rejects_url_unusable_as_location() {
    let registry: Arc<dyn UrlRegistry> = Arc::new(MemoryRegistry::new());
    let handles = handles_with(
        registry.clone(),
        Arc::new(SvgQrRenderer::default()),
        test_settings(),
    );
    let app = init_app!(handles);

    let mut sub = handles.service.bus().subscribe();
    let resp = test::call_service(&app, create_request("http://a.example/x\ny").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "InvalidInput");

    // 没有记录，也没有点击事件
    assert_eq!(registry.count().await.unwrap(), 0);
    handles.service.bus().close();
    assert_eq!(sub.next().await, None);
}

#[actix_rt::test]
async fn test_create_rejects_malformed_json() {
    let app = init_app!(default_handles());

    let req = TestRequest::post()
        .uri("/api/short")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "InvalidInput");
}

#[actix_rt::test]
async fn test_qr_failure_keeps_record() {
    let registry: Arc<dyn UrlRegistry> = Arc::new(MemoryRegistry::new());
    let handles = handles_with(registry.clone(), Arc::new(FailingQr), test_settings());
    let app = init_app!(handles);

    let resp = test::call_service(&app, create_request("http://qr.example").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "ServerError");

    // 记录已保存
    assert!(
        registry
            .find_by_original_url("http://qr.example")
            .await
            .unwrap()
            .is_some()
    );
}

#[actix_rt::test]
async fn test_storage_failure_is_server_error() {
    let handles = handles_with(
        Arc::new(BrokenRegistry),
        Arc::new(SvgQrRenderer::default()),
        test_settings(),
    );
    let app = init_app!(handles);

    let resp = test::call_service(&app, create_request("http://down.example").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "ServerError");
}

#[actix_rt::test]
async fn test_slow_storage_times_out() {
    let registry = Arc::new(SlowRegistry {
        inner: MemoryRegistry::new(),
        delay: Duration::from_millis(500),
    });
    let settings = ApiSettings {
        request_timeout: Duration::from_millis(50),
        ..test_settings()
    };
    let handles = handles_with(registry, Arc::new(SvgQrRenderer::default()), settings);
    let app = init_app!(handles);

    let resp = test::call_service(&app, create_request("http://slow.example").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "Timeout");

    let req = TestRequest::get().uri("/abcd1234").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// GET /{code}
// =============================================================================

#[actix_rt::test]
async fn test_redirect_counts_clicks() {
    let handles = default_handles();
    let app = init_app!(handles);

    let created: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://example.com/target").to_request()).await;

    for _ in 0..2 {
        let req = TestRequest::get()
            .uri(&format!("/{}", created.short_code))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "http://example.com/target"
        );
        assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    }

    let again: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://example.com/target").to_request()).await;
    assert_eq!(again.click_count, 2);
}

#[actix_rt::test]
async fn test_redirect_with_unsendable_stored_url_is_json_error() {
    let registry: Arc<dyn UrlRegistry> = Arc::new(MemoryRegistry::new());
    // 绕过创建校验直接写入
    registry
        .insert(UrlRecord::new("http://a.example/x\ny", "legacy01"))
        .await
        .unwrap();
    let handles = handles_with(registry, Arc::new(SvgQrRenderer::default()), test_settings());
    let app = init_app!(handles);

    let req = TestRequest::get().uri("/legacy01").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "ServerError");
}

#[actix_rt::test]
async fn test_redirect_unknown_code() {
    let app = init_app!(default_handles());

    let req = TestRequest::get().uri("/nosuchcode").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "NotFound");
}

#[actix_rt::test]
async fn test_redirect_invalid_code_is_not_found() {
    let handles = handles_with(
        Arc::new(BrokenRegistry),
        Arc::new(SvgQrRenderer::default()),
        test_settings(),
    );
    let app = init_app!(handles);

    // 非法字符不会触达存储
    let req = TestRequest::get().uri("/bad.code").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /api/history
// =============================================================================

#[actix_rt::test]
async fn test_history_lists_records_in_creation_order() {
    let app = init_app!(default_handles());

    let empty: Vec<HistoryItem> = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/api/history").to_request(),
    )
    .await;
    assert!(empty.is_empty());

    let a: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://a.example").to_request()).await;
    let b: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://b.example").to_request()).await;

    let req = TestRequest::get().uri(&format!("/{}", b.short_code)).to_request();
    test::call_service(&app, req).await;

    let history: Vec<HistoryItem> = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/api/history").to_request(),
    )
    .await;

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].short_code, a.short_code);
    assert_eq!(history[0].click_count, 0);
    assert_eq!(history[1].short_code, b.short_code);
    assert_eq!(history[1].original_url, "http://b.example");
    assert_eq!(history[1].short_url, b.short_url);
    assert_eq!(history[1].click_count, 1);
}

// =============================================================================
// GET /api/events
// =============================================================================

#[actix_rt::test]
async fn test_events_stream_click_updates() {
    let handles = default_handles();
    let app = init_app!(handles);

    let created: CreateShortResponse =
        test::call_and_read_body_json(&app, create_request("http://live.example").to_request()).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/api/events").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(handles.service.bus().subscriber_count(), 1);

    let mut body = resp.into_body();
    assert_eq!(
        next_chunk(&mut body).await.unwrap(),
        Bytes::from_static(b": connected\n\n")
    );

    for _ in 0..2 {
        let req = TestRequest::get()
            .uri(&format!("/{}", created.short_code))
            .to_request();
        test::call_service(&app, req).await;
    }

    for expected in 1..=2 {
        let frame = next_chunk(&mut body).await.unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert_eq!(
            text,
            format!(
                "event: clickUpdate\ndata: {{\"shortCode\":\"{}\",\"clickCount\":{}}}\n\n",
                created.short_code, expected
            )
        );
    }

    // 关闭总线后流结束
    handles.service.bus().close();
    assert!(next_chunk(&mut body).await.is_none());
}

#[actix_rt::test]
async fn test_events_stream_keepalive() {
    let settings = ApiSettings {
        keepalive: Duration::from_millis(50),
        ..test_settings()
    };
    let handles = handles_with(
        Arc::new(MemoryRegistry::new()),
        Arc::new(SvgQrRenderer::default()),
        settings,
    );
    let app = init_app!(handles);

    let resp = test::call_service(&app, TestRequest::get().uri("/api/events").to_request()).await;
    let mut body = resp.into_body();

    assert_eq!(
        next_chunk(&mut body).await.unwrap(),
        Bytes::from_static(b": connected\n\n")
    );
    assert_eq!(
        next_chunk(&mut body).await.unwrap(),
        Bytes::from_static(b": keepalive\n\n")
    );
}

// =============================================================================
// Health
// =============================================================================

#[actix_rt::test]
async fn test_health_endpoints() {
    let handles = default_handles();
    let app = init_app!(handles);

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "memory");
    assert_eq!(body["storage"]["recordsCount"], 0);
    assert_eq!(body["events"]["closed"], false);

    let resp = test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        TestRequest::default()
            .method(actix_web::http::Method::HEAD)
            .uri("/health/live")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    handles.service.bus().close();
    let resp = test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn test_health_reports_broken_storage() {
    let handles = handles_with(
        Arc::new(BrokenRegistry),
        Arc::new(SvgQrRenderer::default()),
        test_settings(),
    );
    let app = init_app!(handles);

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["storage"]["backend"], "broken");
}
