//! # 회원가입/로그인 핸들러
//!
//! - `POST /api/register`, `POST /api/login`, `POST /api/logout` → 가입/로그인/로그아웃
//! - `GET /api/me` → 현재 로그인한 계정 (없으면 `{user: null}`)

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{
        auth::{sign_in, sign_out, MaybeUser},
        json::AppJson,
    },
    models::user::*,
    routes::AppState,
    services::{password, two_factor},
};
use axum::{extract::State, Json};
use tower_sessions::Session;

/// 앞뒤 공백 제거 후 소문자로 변환
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain` 형태만 허용합니다.
/// 공백과 `:`는 거부합니다. `:`는 otpauth URL의 발급자/계정 구분자와 겹칩니다.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .unwrap_or(false);
    if !well_formed || email.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }
    validate_email(&email)?;
    password::validate_new_password(&req.password)?;

    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(&state.pool, &user_id, &email, &password_hash).await?;

    sign_in(&session, &user.id).await?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(Json(UserResponse { user: user.into() }))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = db_users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    if user.totp_enabled {
        let code = req
            .totp_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());

        // 비밀번호는 맞지만 2단계 코드가 없음: 세션은 만들지 않고
        // 클라이언트가 코드를 받아 다시 요청합니다.
        let Some(code) = code else {
            return Ok(Json(LoginResponse {
                requires_2fa: true,
                user: None,
            }));
        };

        let secret = user
            .totp_secret
            .as_deref()
            .ok_or(AppError::Internal("TOTP enabled without a secret".to_string()))?;
        if !two_factor::verify_code(secret, code)? {
            return Err(AppError::Unauthorized("Invalid two-factor code".to_string()));
        }
    }

    sign_in(&session, &user.id).await?;
    tracing::info!(user_id = %user.id, "signed in");

    Ok(Json(LoginResponse {
        requires_2fa: false,
        user: Some(user.into()),
    }))
}

pub async fn logout(session: Session) -> Result<Json<OkResponse>, AppError> {
    sign_out(&session).await?;
    Ok(Json(OkResponse::ok()))
}

/// 비로그인 상태면 401 대신 `{user: null}` (페이지 로드마다 호출됨)
pub async fn me(MaybeUser(user): MaybeUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: user.map(Into::into),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized_and_checked() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada @example.com").is_err());
        assert!(validate_email("a:b@example.com").is_err());
    }
}
