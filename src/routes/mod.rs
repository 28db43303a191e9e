//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이들을 `/api` 아래에 묶는 라우터입니다.
//!
//! 각 하위 모듈:
//! - `account`: 이메일/비밀번호 변경, 이메일/전화 인증
//! - `auth`: 회원가입, 로그인, 로그아웃, 내 정보
//! - `billing`: 결제 세션 생성/확인, 구독 상태
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `transform`: 아홉 가지 텍스트 변환
//! - `two_factor`: TOTP 2단계 인증 설정/해제

pub mod account;
pub mod auth;
pub mod billing;
pub mod health;
pub mod transform;
pub mod two_factor;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    middleware::{auth::MaybeUser, json::AppJson},
    models::{TransformKind, TransformRequest},
    services::{
        checkout::CheckoutProvider, llm::CompletionProvider, quota::QuotaLimits,
        verification::CodeNotifier,
    },
};

/// 애플리케이션 공유 상태
///
/// 모든 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 외부 서비스는 트레이트 객체(`Arc<dyn ...>`)로 들고 있어서
/// 테스트에서는 가짜 구현으로 바꿔 끼울 수 있습니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 언어 모델 API
    pub completions: Arc<dyn CompletionProvider>,
    /// 결제(checkout) API
    pub checkout: Arc<dyn CheckoutProvider>,
    /// 인증 코드 전달 수단
    pub notifier: Arc<dyn CodeNotifier>,
    /// 무료 사용량 한도
    pub limits: QuotaLimits,
    /// 결제 후 돌아올 사이트 origin (끝에 `/` 없음)
    pub site_url: String,
    /// 인증 앱에 표시될 발급자 이름
    pub totp_issuer: String,
}

/// `/api` 아래의 모든 라우트를 묶은 라우터를 만듭니다.
///
/// 세션 레이어(`SessionManagerLayer`)는 호출하는 쪽에서 씌웁니다.
/// 실제 서버는 SQLite 세션 저장소를, 테스트는 메모리 저장소를 사용합니다.
pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        // 인증
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // 계정 설정
        .route("/change-email", post(account::change_email))
        .route("/change-password", post(account::change_password))
        .route("/verify/request-email", post(account::request_email_code))
        .route("/verify/email", post(account::verify_email))
        .route("/verify/request-phone", post(account::request_phone_code))
        .route("/verify/phone", post(account::verify_phone))
        // 2단계 인증
        .route("/2fa/setup", get(two_factor::setup))
        .route("/2fa/enable", post(two_factor::enable))
        .route("/2fa/disable", post(two_factor::disable))
        // 결제/구독
        .route("/create-checkout-session", post(billing::create_checkout_session))
        .route("/confirm-checkout", post(billing::confirm_checkout))
        .route("/subscription-status", get(billing::subscription_status))
        .route("/health", get(health::health_check));

    // 변환 종류마다 `/api/<kind>` 라우트를 하나씩 등록합니다.
    // move 클로저가 kind(Copy)를 캡처하여 핸들러에 넘겨줍니다.
    for kind in TransformKind::ALL {
        api = api.route(
            &format!("/{}", kind.as_str()),
            post(
                move |state: State<AppState>, user: MaybeUser, body: AppJson<TransformRequest>| {
                    transform::transform(state, user, kind, body)
                },
            ),
        );
    }

    // 알 수 없는 `/api/...` 경로(예: 없는 변환 종류)도 `{error}` 형태로 404
    let api = api.fallback(|| async { AppError::NotFound });

    Router::new().nest("/api", api).with_state(state)
}
