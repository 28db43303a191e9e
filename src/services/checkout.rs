//! # Stripe 호스팅 결제
//!
//! Stripe API는 `line_items[0][price_data][currency]`처럼 대괄호 키를 쓰는
//! form 인코딩 본문을 받으므로, 파라미터를 (키, 값) 목록으로 펼쳐 `RequestBuilder::form`으로 보냅니다.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ProviderError;
use crate::models::Plan;

/// 결제 세션 생성 요청 내용
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub plan: Plan,
    pub success_url: String,
    pub cancel_url: String,
    /// 구독을 가질 계정 (로그인한 구매자만)
    pub user_id: Option<String>,
}

/// Stripe 결제 세션 ID 형식: `cs_` 뒤에 영숫자와 `_`만
///
/// ID는 조회 URL 경로에 그대로 들어가므로 `/`, `?`, `..` 같은 문자가 섞이면 안 됩니다.
pub fn is_session_id(id: &str) -> bool {
    id.strip_prefix("cs_").is_some_and(|rest| {
        !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// 상태: `open` / `complete` / `expired`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// 자격 증명이 있는지. 다른 어떤 확인보다 먼저 봅니다.
    fn is_configured(&self) -> bool;

    async fn create_session(&self, params: &CheckoutParams) -> Result<CheckoutSession, ProviderError>;

    async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct StripeCheckout {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
}

impl StripeCheckout {
    pub fn new(secret_key: Option<String>, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.secret_key.as_deref().ok_or(ProviderError::NotConfigured(
            "Payments not configured. Add STRIPE_SECRET_KEY to .env",
        ))
    }

    async fn decode(resp: reqwest::Response) -> Result<CheckoutSession, ProviderError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<wire::ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "Checkout failed".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

/// 결제 파라미터를 Stripe의 대괄호 form 키로 펼칩니다.
pub fn session_form(params: &CheckoutParams) -> Vec<(String, String)> {
    let plan = params.plan;
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "subscription".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("line_items[0][price_data][currency]".into(), "usd".into()),
        (
            "line_items[0][price_data][product_data][name]".into(),
            format!("Wordsmith {}", plan.name),
        ),
        (
            "line_items[0][price_data][product_data][description]".into(),
            format!("Monthly subscription to the {} plan", plan.name),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            plan.price.to_string(),
        ),
        (
            "line_items[0][price_data][recurring][interval]".into(),
            plan.interval.into(),
        ),
        ("line_items[0][quantity]".into(), "1".into()),
        ("success_url".into(), params.success_url.clone()),
        ("cancel_url".into(), params.cancel_url.clone()),
        ("allow_promotion_codes".into(), "true".into()),
        ("metadata[plan]".into(), plan.id.into()),
    ];
    if let Some(user_id) = &params.user_id {
        form.push(("client_reference_id".into(), user_id.clone()));
    }
    form
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    async fn create_session(&self, params: &CheckoutParams) -> Result<CheckoutSession, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(self.key()?)
            .form(&session_form(params))
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, ProviderError> {
        let key = self.key()?;
        if !is_session_id(id) {
            return Err(ProviderError::Api {
                status: 400,
                message: "Invalid checkout session".to_string(),
            });
        }

        let resp = self
            .client
            .get(format!("{}/checkout/sessions/{}", self.api_base, id))
            .bearer_auth(key)
            .send()
            .await?;

        Self::decode(resp).await
    }
}

mod wire {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct ErrorEnvelope {
        pub error: ErrorBody,
    }

    #[derive(Deserialize)]
    pub struct ErrorBody {
        pub message: Option<String>,
    }
}
