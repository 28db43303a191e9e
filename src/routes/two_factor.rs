use axum::{extract::State, Json};

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{auth::AuthUser, json::AppJson},
    models::user::*,
    routes::{account::fresh_user, AppState},
    services::{password, two_factor},
};

/// `GET /api/2fa/setup`: 비활성 비밀키를 새로 저장하고 인증 앱 등록 정보를 돌려줍니다.
/// 다시 호출하면 비밀키를 교체합니다.
pub async fn setup(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<TwoFactorSetup>, AppError> {
    if user.totp_enabled {
        return Err(AppError::BadRequest(
            "Two-factor authentication is already enabled".to_string(),
        ));
    }

    let secret = two_factor::generate_secret()?;
    let enrollment = two_factor::enrollment(&secret, &state.totp_issuer, &user.email)?;
    db_users::store_totp_secret(&state.pool, &user.id, &secret).await?;

    Ok(Json(enrollment))
}

pub async fn enable(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CodeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if user.totp_enabled {
        return Err(AppError::BadRequest(
            "Two-factor authentication is already enabled".to_string(),
        ));
    }
    let secret = user
        .totp_secret
        .as_deref()
        .ok_or(AppError::BadRequest("Start two-factor setup first".to_string()))?;

    if !two_factor::verify_code(secret, &req.code)? {
        return Err(AppError::BadRequest("Invalid code".to_string()));
    }

    db_users::enable_totp(&state.pool, &user.id).await?;
    tracing::info!(user_id = %user.id, "two-factor enabled");

    Ok(Json(fresh_user(&state, &user.id).await?))
}

/// 현재 코드와 비밀번호가 모두 필요합니다.
pub async fn disable(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<DisableTwoFactorRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let secret = match (&user.totp_secret, user.totp_enabled) {
        (Some(secret), true) => secret.as_str(),
        _ => {
            return Err(AppError::BadRequest(
                "Two-factor authentication is not enabled".to_string(),
            ))
        }
    };
    if req.code.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Code and password are required".to_string()));
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Incorrect password".to_string()));
    }
    if !two_factor::verify_code(secret, &req.code)? {
        return Err(AppError::BadRequest("Invalid code".to_string()));
    }

    db_users::disable_totp(&state.pool, &user.id).await?;
    tracing::info!(user_id = %user.id, "two-factor disabled");

    Ok(Json(fresh_user(&state, &user.id).await?))
}
