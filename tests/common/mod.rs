//! 통합 테스트 공용 도구: 메모리 DB와 메모리 세션 저장소 위의 전체 라우터,
//! 외부 서비스(언어 모델, 결제, 코드 전송)의 가짜 구현
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use wordsmith::{
    error::{AppError, ProviderError},
    routes::{self, AppState},
    services::{
        checkout::{CheckoutParams, CheckoutProvider, CheckoutSession},
        llm::CompletionProvider,
        quota::QuotaLimits,
        verification::{Channel, CodeNotifier},
    },
};

pub const GUEST_LIMIT: i64 = 2;
pub const MEMBER_LIMIT: i64 = 3;
pub const ISSUER: &str = "Wordsmith";

/// 정해 둔 출력을 돌려주고 프롬프트를 모두 기록합니다.
#[derive(Default)]
pub struct FakeCompletions {
    pub output: Mutex<String>,
    pub calls: Mutex<Vec<(String, String, f32)>>,
}

#[async_trait]
impl CompletionProvider for FakeCompletions {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string(), temperature));
        Ok(self.output.lock().unwrap().clone())
    }
}

/// 세션 `cs_1`, `cs_2`, ...를 만들고 조회하면 결제 완료로 답합니다.
#[derive(Default)]
pub struct FakeCheckout {
    pub created: Mutex<Vec<CheckoutParams>>,
    pub retrieved: Mutex<Vec<String>>,
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    fn is_configured(&self) -> bool {
        true
    }

    async fn create_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, ProviderError> {
        let mut created = self.created.lock().unwrap();
        created.push(params.clone());
        let id = format!("cs_{}", created.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.test/{}", id)),
            id,
            status: Some("open".into()),
            client_reference_id: params.user_id.clone(),
            metadata: [("plan".to_string(), params.plan.id.to_string())].into(),
        })
    }

    async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, ProviderError> {
        self.retrieved.lock().unwrap().push(id.to_string());
        let created = self.created.lock().unwrap();
        let index = id
            .strip_prefix("cs_")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .filter(|n| *n < created.len())
            .ok_or(ProviderError::Api {
                status: 404,
                message: format!("No such checkout.session: {}", id),
            })?;
        let params = &created[index];
        Ok(CheckoutSession {
            id: id.to_string(),
            url: None,
            status: Some("complete".into()),
            client_reference_id: params.user_id.clone(),
            metadata: [("plan".to_string(), params.plan.id.to_string())].into(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Channel, String, String)>>,
}

impl RecordingNotifier {
    pub fn last_code(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, code)| code.clone())
            .expect("no code was sent")
    }
}

#[async_trait]
impl CodeNotifier for RecordingNotifier {
    async fn send(&self, channel: Channel, target: &str, code: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel, target.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    router: Router,
    pub pool: SqlitePool,
    pub completions: Arc<FakeCompletions>,
    pub checkout: Arc<FakeCheckout>,
    pub notifier: Arc<RecordingNotifier>,
    cookie: Option<String>,
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None, None).await
    }

    /// 실제 제공자(예: 설정 없는 것)로 바꿔 끼웁니다.
    pub async fn build(
        completions: Option<Arc<dyn CompletionProvider>>,
        checkout: Option<Arc<dyn CheckoutProvider>>,
    ) -> Self {
        let pool = test_pool().await;
        let fake_completions = Arc::new(FakeCompletions::default());
        let fake_checkout = Arc::new(FakeCheckout::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let state = AppState {
            pool: pool.clone(),
            completions: completions
                .unwrap_or_else(|| fake_completions.clone() as Arc<dyn CompletionProvider>),
            checkout: checkout
                .unwrap_or_else(|| fake_checkout.clone() as Arc<dyn CheckoutProvider>),
            notifier: notifier.clone(),
            limits: QuotaLimits {
                guest_daily: GUEST_LIMIT,
                member_daily: MEMBER_LIMIT,
            },
            site_url: "http://localhost:3000".into(),
            totp_issuer: ISSUER.into(),
        };

        let router =
            routes::router(state).layer(SessionManagerLayer::new(MemoryStore::default()));

        Self {
            router,
            pool,
            completions: fake_completions,
            checkout: fake_checkout,
            notifier,
            cookie: None,
        }
    }

    pub fn set_output(&self, output: &str) {
        *self.completions.output.lock().unwrap() = output.to_string();
    }

    /// 새 브라우저처럼 세션 쿠키를 잊습니다.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        match body {
            Some(json) => {
                let bytes = serde_json::to_vec(&json).unwrap();
                self.send(method, uri, Some("application/json"), Body::from(bytes))
                    .await
            }
            None => self.send(method, uri, None, Body::empty()).await,
        }
    }

    /// `body`를 그대로 보냅니다 (깨진 JSON, JSON이 아닌 Content-Type 등).
    pub async fn post_raw(&mut self, uri: &str, content_type: &str, body: &str) -> TestResponse {
        self.send(
            Method::POST,
            uri,
            Some(content_type),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap_or_default();
            let cleared = pair.split_once('=').map(|(_, v)| v.is_empty()).unwrap_or(true)
                || value.to_str().unwrap().contains("Max-Age=0");
            self.cookie = if cleared { None } else { Some(pair.to_string()) };
        }

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        self.request(Method::POST, uri, None).await
    }

    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/register",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }
}

/// 인증 앱이 지금 `secret`에 대해 보여줄 코드
pub fn totp_now(secret: &str) -> String {
    use totp_rs::{Algorithm, Secret, TOTP};

    let bytes = Secret::Encoded(secret.to_string()).to_bytes().unwrap();
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        bytes,
        Some(ISSUER.to_string()),
        "account".to_string(),
    )
    .unwrap()
    .generate_current()
    .unwrap()
}

/// 형식은 맞지만 `code`와 다른 코드
pub fn wrong_code(code: &str) -> String {
    code.chars()
        .map(|c| char::from_digit((c.to_digit(10).unwrap_or(0) + 5) % 10, 10).unwrap())
        .collect()
}
