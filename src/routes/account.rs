//! # 계정 설정 핸들러
//!
//! 이메일/비밀번호 변경과 이메일/전화 소유 확인. 모두 로그인이 필요합니다.

use axum::{extract::State, Json};

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{auth::AuthUser, json::AppJson},
    models::user::*,
    routes::{
        auth::{normalize_email, validate_email},
        AppState,
    },
    services::{
        password,
        verification::{self, Channel},
    },
};

/// 변경 후 계정을 다시 읽습니다.
pub(crate) async fn fresh_user(state: &AppState, id: &str) -> Result<UserResponse, AppError> {
    let user = db_users::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(UserResponse { user: user.into() })
}

pub async fn change_email(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<ChangeEmailRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let new_email = normalize_email(&req.new_email);
    if new_email.is_empty() {
        return Err(AppError::BadRequest("Enter new email".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password required".to_string()));
    }
    validate_email(&new_email)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Incorrect password".to_string()));
    }
    if new_email == user.email {
        return Err(AppError::BadRequest("That is already your email".to_string()));
    }
    if db_users::find_by_email(&state.pool, &new_email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    db_users::update_email(&state.pool, &user.id, &new_email).await?;
    tracing::info!(user_id = %user.id, "email changed");

    Ok(Json(fresh_user(&state, &user.id).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Json<OkResponse>, AppError> {
    if req.current_password.is_empty() {
        return Err(AppError::BadRequest("Current password required".to_string()));
    }
    password::validate_new_password(&req.new_password)?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    db_users::update_password(&state.pool, &user.id, &password_hash).await?;
    tracing::info!(user_id = %user.id, "password changed");

    Ok(Json(OkResponse::ok()))
}

pub async fn request_email_code(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> Result<Json<OkResponse>, AppError> {
    if user.email_verified {
        return Err(AppError::BadRequest("Email already verified".to_string()));
    }

    verification::issue(
        &state.pool,
        state.notifier.as_ref(),
        &user.id,
        Channel::Email,
        &user.email,
    )
    .await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn verify_email(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CodeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let target = verification::confirm(&state.pool, &user.id, Channel::Email, &req.code).await?;
    // 코드를 보낸 뒤 주소가 바뀐 경우
    if target != user.email {
        return Err(AppError::BadRequest("Invalid or expired code".to_string()));
    }

    db_users::set_email_verified(&state.pool, &user.id).await?;
    Ok(Json(fresh_user(&state, &user.id).await?))
}

pub async fn request_phone_code(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<PhoneRequest>,
) -> Result<Json<OkResponse>, AppError> {
    if req.phone.trim().is_empty() {
        return Err(AppError::BadRequest("Phone number required".to_string()));
    }
    let phone = verification::normalize_phone(&req.phone)?;

    if user.phone_verified && user.phone.as_deref() == Some(phone.as_str()) {
        return Err(AppError::BadRequest("Phone already verified".to_string()));
    }

    db_users::update_phone(&state.pool, &user.id, &phone).await?;
    verification::issue(
        &state.pool,
        state.notifier.as_ref(),
        &user.id,
        Channel::Phone,
        &phone,
    )
    .await?;

    Ok(Json(OkResponse::ok()))
}

pub async fn verify_phone(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<CodeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let target = verification::confirm(&state.pool, &user.id, Channel::Phone, &req.code).await?;
    if user.phone.as_deref() != Some(target.as_str()) {
        return Err(AppError::BadRequest("Invalid or expired code".to_string()));
    }

    db_users::set_phone_verified(&state.pool, &user.id).await?;
    Ok(Json(fresh_user(&state, &user.id).await?))
}
