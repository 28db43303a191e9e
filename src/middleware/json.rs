//! # JSON 요청 본문 추출기
//!
//! `axum::Json`을 감싸서 거부(rejection)도 `AppError`로 바꿉니다.
//! 본문이 JSON이 아니거나 필드가 빠져도 다른 에러와 같은 `{ "error": "..." }` 형태로 응답합니다.

use axum::extract::FromRequest;

use crate::error::AppError;

/// 핸들러의 `Json<T>` 대신 쓰는 추출기
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
