//! 컨트롤러 테스트용 메모리 [`Backend`]

use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{
    ChangeEmailRequest, ChangePasswordRequest, DisableTwoFactorRequest, LoginRequest,
    LoginResponse, Quota, RegisterRequest, TransformKind, TransformRequest, TransformResponse,
    TwoFactorSetup, UserSnapshot,
};

use super::api::{Backend, ClientError, TransformReply};

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<ClientError>>,
    output: Mutex<String>,
    quota: Mutex<Option<Quota>>,
    requires_two_factor: bool,
    user: Mutex<Option<UserSnapshot>>,
    transforms: Mutex<Vec<(TransformKind, TransformRequest)>>,
    logins: Mutex<Vec<LoginRequest>>,
    checkouts: Mutex<Vec<String>>,
    status_ids: Mutex<Vec<Option<String>>>,
}

fn snapshot(email: &str) -> UserSnapshot {
    UserSnapshot {
        id: "u1".into(),
        email: email.into(),
        email_verified: false,
        phone: None,
        phone_verified: false,
        totp_enabled: false,
        plan: "free".into(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(self, output: &str) -> Self {
        self.set_output(output);
        self
    }

    pub fn with_quota(self, quota: Quota) -> Self {
        *self.quota.lock().unwrap() = Some(quota);
        self
    }

    pub fn requiring_two_factor(mut self) -> Self {
        self.requires_two_factor = true;
        self
    }

    pub fn signed_in(self, email: &str) -> Self {
        *self.user.lock().unwrap() = Some(snapshot(email));
        self
    }

    pub fn set_output(&self, output: &str) {
        *self.output.lock().unwrap() = output.to_string();
    }

    /// 다음 호출 하나를 `err`로 실패시킵니다.
    pub fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transform_requests(&self) -> Vec<(TransformKind, TransformRequest)> {
        self.transforms.lock().unwrap().clone()
    }

    pub fn login_requests(&self) -> Vec<LoginRequest> {
        self.logins.lock().unwrap().clone()
    }

    pub fn checkout_plans(&self) -> Vec<String> {
        self.checkouts.lock().unwrap().clone()
    }

    pub fn status_client_ids(&self) -> Vec<Option<String>> {
        self.status_ids.lock().unwrap().clone()
    }

    fn enter(&self, call: &'static str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn update_user(&self, f: impl FnOnce(&mut UserSnapshot)) -> Result<UserSnapshot, ClientError> {
        let mut user = self.user.lock().unwrap();
        let user = user.as_mut().ok_or(ClientError::Api {
            status: 401,
            message: "Not signed in".into(),
        })?;
        f(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn transform(
        &self,
        kind: TransformKind,
        req: &TransformRequest,
    ) -> Result<TransformReply, ClientError> {
        self.transforms.lock().unwrap().push((kind, req.clone()));
        self.enter("transform")?;
        let quota = self.quota.lock().unwrap().clone();
        let output = self.output.lock().unwrap().clone();
        Ok(TransformReply {
            response: TransformResponse::new(kind, output, quota.clone()),
            quota,
        })
    }

    async fn me(&self) -> Result<Option<UserSnapshot>, ClientError> {
        self.enter("me")?;
        Ok(self.user.lock().unwrap().clone())
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.logins.lock().unwrap().push(req.clone());
        self.enter("login")?;
        if self.requires_two_factor && req.totp_code.is_none() {
            return Ok(LoginResponse {
                requires_2fa: true,
                user: None,
            });
        }
        let user = snapshot(&req.email);
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(LoginResponse {
            requires_2fa: false,
            user: Some(user),
        })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<UserSnapshot, ClientError> {
        self.enter("register")?;
        let user = snapshot(&req.email);
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.enter("logout")?;
        *self.user.lock().unwrap() = None;
        Ok(())
    }

    async fn change_email(&self, req: &ChangeEmailRequest) -> Result<UserSnapshot, ClientError> {
        self.enter("change_email")?;
        self.update_user(|user| {
            user.email = req.new_email.clone();
            user.email_verified = false;
        })
    }

    async fn change_password(&self, _req: &ChangePasswordRequest) -> Result<(), ClientError> {
        self.enter("change_password")
    }

    async fn request_email_code(&self) -> Result<(), ClientError> {
        self.enter("request_email_code")
    }

    async fn verify_email(&self, _code: &str) -> Result<UserSnapshot, ClientError> {
        self.enter("verify_email")?;
        self.update_user(|user| user.email_verified = true)
    }

    async fn request_phone_code(&self, phone: &str) -> Result<(), ClientError> {
        self.enter("request_phone_code")?;
        self.update_user(|user| {
            user.phone = Some(phone.to_string());
            user.phone_verified = false;
        })?;
        Ok(())
    }

    async fn verify_phone(&self, _code: &str) -> Result<UserSnapshot, ClientError> {
        self.enter("verify_phone")?;
        self.update_user(|user| user.phone_verified = true)
    }

    async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ClientError> {
        self.enter("setup_two_factor")?;
        Ok(TwoFactorSetup {
            secret: "JBSWY3DPEHPK3PXP".into(),
            otpauth_url: "otpauth://totp/Wordsmith:ada?secret=JBSWY3DPEHPK3PXP".into(),
            qr_data_url: "data:image/png;base64,".into(),
        })
    }

    async fn enable_two_factor(&self, _code: &str) -> Result<UserSnapshot, ClientError> {
        self.enter("enable_two_factor")?;
        self.update_user(|user| user.totp_enabled = true)
    }

    async fn disable_two_factor(
        &self,
        _req: &DisableTwoFactorRequest,
    ) -> Result<UserSnapshot, ClientError> {
        self.enter("disable_two_factor")?;
        self.update_user(|user| user.totp_enabled = false)
    }

    async fn create_checkout(&self, plan: &str) -> Result<String, ClientError> {
        self.checkouts.lock().unwrap().push(plan.to_string());
        self.enter("create_checkout")?;
        Ok(format!("https://checkout.test/{}", plan))
    }

    async fn subscription_status(&self, client_id: Option<&str>) -> Result<Quota, ClientError> {
        self.status_ids
            .lock()
            .unwrap()
            .push(client_id.map(str::to_string));
        self.enter("subscription_status")?;
        Ok(self.quota.lock().unwrap().clone().unwrap_or(Quota {
            plan: "free".into(),
            remaining: 5,
        }))
    }
}
