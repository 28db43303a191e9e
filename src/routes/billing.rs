//! # 결제/구독 핸들러
//!
//! - `POST /api/create-checkout-session` → Stripe 호스팅 결제 페이지 URL
//! - `POST /api/confirm-checkout` → 결제 완료 후 계정 플랜 갱신 (success 페이지에서 호출)
//! - `GET /api/subscription-status?client_id=` → 현재 플랜과 남은 횟수

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    db::users as db_users,
    error::{AppError, ProviderError},
    middleware::{
        auth::{AuthUser, MaybeUser},
        json::AppJson,
    },
    models::{
        CheckoutRequest, CheckoutResponse, ConfirmCheckoutRequest, Plan, Quota, UserResponse,
    },
    routes::{account::fresh_user, AppState},
    services::{
        checkout::{self, CheckoutParams},
        quota::{self, Subject},
    },
};

pub async fn create_checkout_session(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    AppJson(req): AppJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    // 키가 없으면 Stripe를 부르기 전에 503
    if !state.checkout.is_configured() {
        return Err(AppError::ServiceUnavailable(
            "Payments not configured. Add STRIPE_SECRET_KEY to .env".to_string(),
        ));
    }

    let plan = Plan::lookup(req.plan.as_deref());
    let params = CheckoutParams {
        plan,
        success_url: format!(
            "{}/success.html?session_id={{CHECKOUT_SESSION_ID}}",
            state.site_url
        ),
        cancel_url: format!("{}/#pricing", state.site_url),
        user_id: user.map(|user| user.id),
    };

    let session = state.checkout.create_session(&params).await?;
    tracing::info!(plan = plan.id, session_id = %session.id, "checkout session created");

    let url = session.url.ok_or_else(|| {
        ProviderError::Malformed("Checkout session has no redirect URL".to_string())
    })?;

    Ok(Json(CheckoutResponse { url }))
}

pub async fn confirm_checkout(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(req): AppJson<ConfirmCheckoutRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let session_id = req.session_id.trim();
    if session_id.is_empty() {
        return Err(AppError::BadRequest("Missing checkout session".to_string()));
    }
    if !state.checkout.is_configured() {
        return Err(AppError::ServiceUnavailable(
            "Payments not configured. Add STRIPE_SECRET_KEY to .env".to_string(),
        ));
    }
    // 세션 ID는 Stripe 조회 URL 경로에 들어갑니다.
    if !checkout::is_session_id(session_id) {
        return Err(AppError::BadRequest("Invalid checkout session".to_string()));
    }

    let session = state.checkout.retrieve_session(session_id).await?;
    if !session.is_complete() {
        return Err(AppError::BadRequest("Checkout is not complete".to_string()));
    }

    // 로그인하지 않은 채 결제했거나 다른 계정의 결제면 연결하지 않습니다.
    if session.client_reference_id.as_deref() != Some(user.id.as_str()) {
        return Err(AppError::BadRequest(
            "This checkout belongs to a different account".to_string(),
        ));
    }

    let plan = Plan::lookup(session.metadata.get("plan").map(String::as_str));
    db_users::set_plan(&state.pool, &user.id, plan.id).await?;
    tracing::info!(user_id = %user.id, plan = plan.id, "plan upgraded");

    Ok(Json(fresh_user(&state, &user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub client_id: Option<String>,
}

/// 사용량을 기록하지 않고 현재 남은 횟수만 돌려줍니다.
pub async fn subscription_status(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Quota>, AppError> {
    let subject = Subject::resolve(user.as_ref(), query.client_id.as_deref());
    Ok(Json(quota::current(&state.pool, &subject, state.limits).await?))
}
