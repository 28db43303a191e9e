//! # `/api` 호출 계층
//!
//! 컨트롤러는 [`Backend`] 트레이트만 봅니다. 실제 구현인 [`HttpBackend`]는
//! 쿠키 저장소를 켠 `reqwest` 클라이언트라서 `/api/login`이 준 세션 쿠키가 이후 요청에 실립니다.
//!
//! 실패 응답의 본문을 JSON으로 읽지 못했을 때의 처리는 호출마다 다릅니다 ([`OnFailure`]).
//! - 변환 요청: `ClientError::InvalidResponse`
//! - 결제 요청: "Server error. Please try again."
//! - 계정/설정 요청: 빈 본문으로 보고 호출별 기본 문구

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ChangeEmailRequest, ChangePasswordRequest, CheckoutRequest, CheckoutResponse, CodeRequest,
    DisableTwoFactorRequest, LoginRequest, LoginResponse, MeResponse, OkResponse, PhoneRequest,
    Quota, RegisterRequest, TransformKind, TransformRequest, TransformResponse, TwoFactorSetup,
    UserResponse, UserSnapshot, GUEST_TIER, RATE_LIMIT_REACHED_HEADER,
    RATE_LIMIT_REMAINING_HEADER, SUBSCRIPTION_PLAN_HEADER,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// 요청을 보내기 전에 걸러진 입력 오류
    #[error("{0}")]
    Validation(String),

    #[error("Network error: check connection and try again")]
    Network,

    #[error("Server returned invalid response. Try again.")]
    InvalidResponse,

    /// 2xx가 아닌 응답. `message`는 본문의 `error` 또는 호출별 기본 문구
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 429 응답. `tier`는 `X-Rate-Limit-Reached` 헤더 값
    #[error("{message}")]
    RateLimited {
        tier: Option<String>,
        message: String,
        quota: Option<Quota>,
    },

    #[error("HTTP client setup failed: {0}")]
    Setup(reqwest::Error),
}

impl ClientError {
    /// 가입 안내는 비회원 한도(`free`)에서만 띄웁니다. 회원 한도 초과는 일반 에러입니다.
    pub fn opens_signup_prompt(&self) -> bool {
        matches!(self, ClientError::RateLimited { tier: Some(tier), .. } if tier == GUEST_TIER)
    }
}

/// 변환 결과와 남은 횟수. 횟수는 본문의 `quota`가 우선이고 없으면 응답 헤더에서 읽습니다.
#[derive(Debug, Clone, Default)]
pub struct TransformReply {
    pub response: TransformResponse,
    pub quota: Option<Quota>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn transform(
        &self,
        kind: TransformKind,
        req: &TransformRequest,
    ) -> Result<TransformReply, ClientError>;

    /// 비로그인이면 `None`
    async fn me(&self) -> Result<Option<UserSnapshot>, ClientError>;
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;
    async fn register(&self, req: &RegisterRequest) -> Result<UserSnapshot, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;

    async fn change_email(&self, req: &ChangeEmailRequest) -> Result<UserSnapshot, ClientError>;
    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<(), ClientError>;
    async fn request_email_code(&self) -> Result<(), ClientError>;
    async fn verify_email(&self, code: &str) -> Result<UserSnapshot, ClientError>;
    async fn request_phone_code(&self, phone: &str) -> Result<(), ClientError>;
    async fn verify_phone(&self, code: &str) -> Result<UserSnapshot, ClientError>;

    async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ClientError>;
    async fn enable_two_factor(&self, code: &str) -> Result<UserSnapshot, ClientError>;
    async fn disable_two_factor(
        &self,
        req: &DisableTwoFactorRequest,
    ) -> Result<UserSnapshot, ClientError>;

    /// `plan`의 결제 페이지 URL
    async fn create_checkout(&self, plan: &str) -> Result<String, ClientError>;
    async fn subscription_status(&self, client_id: Option<&str>) -> Result<Quota, ClientError>;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    quota: Option<Quota>,
}

/// `X-Subscription-Plan` / `X-RateLimit-Remaining` 헤더의 남은 횟수.
/// 플랜만 있고 횟수가 없으면 무제한입니다.
pub fn quota_from_headers(headers: &HeaderMap) -> Option<Quota> {
    let plan = headers
        .get(SUBSCRIPTION_PLAN_HEADER)?
        .to_str()
        .ok()
        .filter(|plan| !plan.is_empty())?;
    let remaining = headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(Quota::UNLIMITED);
    Some(Quota {
        plan: plan.to_string(),
        remaining,
    })
}

/// 실패 응답 본문을 읽는 규칙
#[derive(Debug, Clone, Copy)]
pub struct OnFailure {
    /// JSON 본문에 `error`가 없을 때의 문구
    pub fallback: &'static str,
    pub unreadable: Unreadable,
}

/// 실패 응답 본문이 JSON이 아닐 때 (예: 프록시의 HTML 502)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unreadable {
    /// `{}`로 보고 `fallback`을 씁니다.
    Empty,
    /// `ClientError::InvalidResponse`로 실패
    Invalid,
    /// 이 문구의 `ClientError::Api`
    Message(&'static str),
}

impl OnFailure {
    pub const fn lenient(fallback: &'static str) -> Self {
        Self {
            fallback,
            unreadable: Unreadable::Empty,
        }
    }

    pub const TRANSFORM: OnFailure = OnFailure {
        fallback: "Request failed",
        unreadable: Unreadable::Invalid,
    };

    pub const CHECKOUT: OnFailure = OnFailure {
        fallback: "Checkout failed",
        unreadable: Unreadable::Message("Server error. Please try again."),
    };

    /// 실패 응답(`status`, `headers`, 본문)을 [`ClientError`]로 바꿉니다.
    pub fn classify(self, status: StatusCode, headers: &HeaderMap, bytes: &[u8]) -> ClientError {
        let body = match serde_json::from_slice::<ErrorBody>(bytes) {
            Ok(body) => body,
            Err(_) => match self.unreadable {
                Unreadable::Empty => ErrorBody::default(),
                Unreadable::Invalid => return ClientError::InvalidResponse,
                Unreadable::Message(message) => {
                    return ClientError::Api {
                        status: status.as_u16(),
                        message: message.to_string(),
                    }
                }
            },
        };
        let message = body
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| self.fallback.to_string());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let tier = headers
                .get(RATE_LIMIT_REACHED_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            return ClientError::RateLimited {
                tier,
                message,
                quota: body.quota,
            };
        }
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// `base_url`은 사이트 origin. `reqwest`는 절대 URL만 받으므로 빈 문자열은 안 됩니다.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ClientError::Setup)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// `req`를 보내고 성공 본문을 `T`로 읽습니다.
    ///
    /// 전송 실패는 `Network`, 읽을 수 없는 성공 본문은 `InvalidResponse`,
    /// 실패 상태 코드는 `on_failure` 규칙을 따릅니다.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        on_failure: OnFailure,
    ) -> Result<(HeaderMap, T), ClientError> {
        let resp = req.send().await.map_err(|err| {
            tracing::debug!(error = %err, "request failed");
            ClientError::Network
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|_| ClientError::Network)?;

        if !status.is_success() {
            return Err(on_failure.classify(status, &headers, &bytes));
        }

        let body = serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidResponse)?;
        Ok((headers, body))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        on_failure: OnFailure,
    ) -> Result<T, ClientError> {
        let (_, body) = self
            .send(self.client.post(self.url(path)).json(body), on_failure)
            .await?;
        Ok(body)
    }
}

const SETTINGS: OnFailure = OnFailure::lenient("Failed");

#[derive(Serialize)]
struct Empty {}

#[async_trait]
impl Backend for HttpBackend {
    async fn transform(
        &self,
        kind: TransformKind,
        req: &TransformRequest,
    ) -> Result<TransformReply, ClientError> {
        let (headers, response): (_, TransformResponse) = self
            .send(
                self.client.post(self.url(kind.as_str())).json(req),
                OnFailure::TRANSFORM,
            )
            .await?;
        let quota = response
            .quota
            .clone()
            .or_else(|| quota_from_headers(&headers));
        Ok(TransformReply { response, quota })
    }

    async fn me(&self) -> Result<Option<UserSnapshot>, ClientError> {
        let (_, body): (_, MeResponse) = self
            .send(self.client.get(self.url("me")), OnFailure::lenient("Request failed"))
            .await?;
        Ok(body.user)
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.post("login", req, OnFailure::lenient("Login failed")).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<UserSnapshot, ClientError> {
        let body: UserResponse = self
            .post("register", req, OnFailure::lenient("Registration failed"))
            .await?;
        Ok(body.user)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let _: OkResponse = self
            .post("logout", &Empty {}, OnFailure::lenient("Request failed"))
            .await?;
        Ok(())
    }

    async fn change_email(&self, req: &ChangeEmailRequest) -> Result<UserSnapshot, ClientError> {
        let body: UserResponse = self.post("change-email", req, SETTINGS).await?;
        Ok(body.user)
    }

    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<(), ClientError> {
        let _: OkResponse = self.post("change-password", req, SETTINGS).await?;
        Ok(())
    }

    async fn request_email_code(&self) -> Result<(), ClientError> {
        let _: OkResponse = self
            .post("verify/request-email", &Empty {}, SETTINGS)
            .await?;
        Ok(())
    }

    async fn verify_email(&self, code: &str) -> Result<UserSnapshot, ClientError> {
        let req = CodeRequest {
            code: code.to_string(),
        };
        let body: UserResponse = self.post("verify/email", &req, SETTINGS).await?;
        Ok(body.user)
    }

    async fn request_phone_code(&self, phone: &str) -> Result<(), ClientError> {
        let req = PhoneRequest {
            phone: phone.to_string(),
        };
        let _: OkResponse = self.post("verify/request-phone", &req, SETTINGS).await?;
        Ok(())
    }

    async fn verify_phone(&self, code: &str) -> Result<UserSnapshot, ClientError> {
        let req = CodeRequest {
            code: code.to_string(),
        };
        let body: UserResponse = self.post("verify/phone", &req, SETTINGS).await?;
        Ok(body.user)
    }

    async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ClientError> {
        let (_, body) = self
            .send(self.client.get(self.url("2fa/setup")), SETTINGS)
            .await?;
        Ok(body)
    }

    async fn enable_two_factor(&self, code: &str) -> Result<UserSnapshot, ClientError> {
        let req = CodeRequest {
            code: code.to_string(),
        };
        let body: UserResponse = self.post("2fa/enable", &req, SETTINGS).await?;
        Ok(body.user)
    }

    async fn disable_two_factor(
        &self,
        req: &DisableTwoFactorRequest,
    ) -> Result<UserSnapshot, ClientError> {
        let body: UserResponse = self.post("2fa/disable", req, SETTINGS).await?;
        Ok(body.user)
    }

    async fn create_checkout(&self, plan: &str) -> Result<String, ClientError> {
        let req = CheckoutRequest {
            plan: Some(plan.to_string()),
        };
        let body: CheckoutResponse = self
            .post("create-checkout-session", &req, OnFailure::CHECKOUT)
            .await?;
        if body.url.is_empty() {
            return Err(ClientError::Api {
                status: 200,
                message: "No checkout URL received".to_string(),
            });
        }
        Ok(body.url)
    }

    async fn subscription_status(&self, client_id: Option<&str>) -> Result<Quota, ClientError> {
        let mut req = self.client.get(self.url("subscription-status"));
        if let Some(client_id) = client_id {
            req = req.query(&[("client_id", client_id)]);
        }
        let (_, body) = self.send(req, OnFailure::lenient("Request failed")).await?;
        Ok(body)
    }
}
