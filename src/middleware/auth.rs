use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{db::users as db_users, error::AppError, models::User, routes::AppState};

/// 세션에 로그인한 계정 ID를 저장하는 키
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// 로그인한 계정. 요청마다 DB에서 새로 읽습니다.
///
/// 세션에 사용자가 없거나 계정이 삭제됐으면 401
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// [`AuthUser`]와 같지만 거부하지 않습니다. 비로그인이면 `None`
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

async fn session_user(parts: &mut Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

    let Some(user_id) = session.get::<String>(SESSION_USER_ID_KEY).await? else {
        return Ok(None);
    };

    let user = db_users::find_by_id(&state.pool, &user_id).await?;
    if user.is_none() {
        // 삭제된 계정을 가리키는 세션
        session.flush().await?;
    }
    Ok(user)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(|user| AuthUser { user })
            .ok_or(AppError::Unauthorized("Not signed in".to_string()))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await?))
    }
}

/// 세션에 `user_id`를 저장합니다. 로그인 전 쿠키를 재사용할 수 없도록
/// 먼저 세션 ID를 교체합니다.
pub async fn sign_in(session: &Session, user_id: &str) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
