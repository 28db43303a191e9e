//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! - `AppError`: 라우트 핸들러가 반환하는 에러. `IntoResponse`를 구현하여
//!   `{ "error": "메시지" }` 형태의 JSON 응답으로 자동 변환됩니다.
//! - `ProviderError`: 외부 서비스(언어 모델 API, 결제 API) 호출 에러

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면 Axum이 `IntoResponse`를 호출하여
/// 적절한 상태 코드와 JSON 본문으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409), 예: 이미 가입된 이메일
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 외부 서비스 설정이 없음 (HTTP 503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// 외부 서비스(언어 모델, 결제) 호출 실패 (HTTP 500)
    /// 메시지는 그대로 클라이언트에 전달됩니다.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: `?` 연산자로 sqlx::Error가 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 세션 저장소 오류 (HTTP 500)
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// 파일 입출력 오류 (HTTP 500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Provider(_)
            | AppError::Internal(_)
            | AppError::Database(_)
            | AppError::Session(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// 내부 에러(Database, Session, IO, Internal)는 실제 내용을 로그에만 남기고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound => "Resource not found".to_string(),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg) => msg,
            AppError::Provider(e) => {
                tracing::error!("Provider error: {}", e);
                e.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {}", e);
                "A session error occurred".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                "An IO error occurred".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// JSON 본문 파싱 실패 (HTTP 400)
/// 본문이 깨졌거나 Content-Type이 다르거나 필드가 맞지 않는 경우입니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// 외부 API(언어 모델, Stripe) 호출 에러
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 자격 증명(API 키)이 설정되지 않음
    #[error("{0}")]
    NotConfigured(&'static str),

    /// 네트워크/전송 계층 실패
    #[error("Request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 제공자가 에러 응답을 반환함. 메시지는 제공자가 보낸 그대로입니다.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 응답 형식이 예상과 다름
    #[error("Unexpected provider response: {0}")]
    Malformed(String),
}
