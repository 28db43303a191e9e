//! # 텍스트 변환 핸들러
//!
//! `POST /api/{complete|rewrite|grammar|summarize|expand|bullets|simplify|paraphrase|outline}`
//!
//! 본문은 `{text, tone?, client_id}`. complete는 `{completion}`, 나머지는 `{text}`로 답하고
//! `quota` 객체를 함께 보냅니다. 같은 값을
//! `X-Subscription-Plan` / `X-RateLimit-Remaining` 헤더에도 씁니다.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    middleware::{auth::MaybeUser, json::AppJson},
    models::{
        Quota, TransformKind, TransformRequest, TransformResponse, RATE_LIMIT_REACHED_HEADER,
        RATE_LIMIT_REMAINING_HEADER, SUBSCRIPTION_PLAN_HEADER,
    },
    routes::AppState,
    services::{
        prompts,
        quota::{self, Subject},
    },
};

pub async fn transform(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    kind: TransformKind,
    AppJson(req): AppJson<TransformRequest>,
) -> Result<Response, AppError> {
    let subject = Subject::resolve(user.as_ref(), req.client_id.as_deref());

    let allowance = quota::current(&state.pool, &subject, state.limits).await?;
    if !allowance.is_unlimited() && allowance.remaining == 0 {
        tracing::info!(subject = %subject.key(), %kind, "daily limit reached");
        return Ok(rate_limited(&subject, &allowance));
    }

    let instruction = prompts::system_instruction(kind, req.tone.as_deref());
    // 언어 모델 API는 빈 사용자 메시지를 거부합니다.
    let text = match req.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => " ",
    };

    let output = state
        .completions
        .complete(instruction, text, prompts::TEMPERATURE)
        .await?;
    tracing::debug!(%kind, input_len = text.len(), output_len = output.len(), "transform done");

    let allowance = quota::record(&state.pool, &subject, state.limits).await?;

    let mut headers = HeaderMap::new();
    quota_headers(&mut headers, &allowance);
    Ok((
        headers,
        Json(TransformResponse::new(kind, output, Some(allowance))),
    )
        .into_response())
}

fn quota_headers(headers: &mut HeaderMap, allowance: &Quota) {
    if let Ok(plan) = HeaderValue::from_str(&allowance.plan) {
        headers.insert(HeaderName::from_static(SUBSCRIPTION_PLAN_HEADER), plan);
    }
    if !allowance.is_unlimited() {
        headers.insert(
            HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
            HeaderValue::from(allowance.remaining),
        );
    }
}

fn rate_limited(subject: &Subject, allowance: &Quota) -> Response {
    let message = match subject {
        Subject::Guest { .. } => "Daily free limit reached. Sign up or log in to keep writing.",
        _ => "Daily limit reached. Upgrade your plan to keep writing.",
    };

    let mut headers = HeaderMap::new();
    quota_headers(&mut headers, allowance);
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_REACHED_HEADER),
        HeaderValue::from_static(subject.exhausted_tier()),
    );

    (
        StatusCode::TOO_MANY_REQUESTS,
        headers,
        Json(json!({ "error": message, "quota": allowance })),
    )
        .into_response()
}
