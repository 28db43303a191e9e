//! # 로그인 상태 머신
//!
//! `guest ⇄ auth modal {login|register} ⇄ pending second factor → authenticated ⇄ settings`
//!
//! 세션 상태는 [`AuthController`]만 갖고 있고,
//! 화면은 컨트롤러가 쓴 [`ViewModel`]을 통해서만 읽습니다.

use std::fmt;

use crate::models::{LoginRequest, RegisterRequest, UserSnapshot};
use crate::services::password::MIN_PASSWORD_LEN;
use crate::services::two_factor;

use super::api::{Backend, ClientError};
use super::settings::SettingsView;
use super::view::{AuthTab, ViewModel};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Guest,
    Authenticated(UserSnapshot),
}

/// `requires2FA` 응답부터 코드 제출까지 들고 있는 자격 증명
/// 메모리에만 있습니다.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub email: String,
    password: String,
}

impl fmt::Debug for PendingChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingChallenge")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// 로그인/회원가입 창의 입력값
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Debug, Default)]
pub struct AuthController {
    state: SessionState,
    pending: Option<PendingChallenge>,
}

impl AuthController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&UserSnapshot> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Guest => None,
        }
    }

    pub fn pending_challenge(&self) -> Option<&PendingChallenge> {
        self.pending.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: SessionState, view: &mut ViewModel) {
        self.state = state;
        view.signed_in_as = self.user().map(|user| user.email.clone());
        if view.modals.settings {
            view.settings = self.user().map(SettingsView::from_snapshot);
        }
        if self.user().is_none() {
            view.modals.settings = false;
            view.settings = None;
            view.profile_dropdown_open = false;
        }
    }

    /// `/api/me`를 다시 읽습니다. 실패하면 로그아웃 상태로 봅니다.
    pub async fn refresh(&mut self, backend: &dyn Backend, view: &mut ViewModel) {
        let state = match backend.me().await {
            Ok(Some(user)) => SessionState::Authenticated(user),
            Ok(None) => SessionState::Guest,
            Err(err) => {
                tracing::debug!(error = %err, "session refresh failed");
                SessionState::Guest
            }
        };
        self.set_state(state, view);
    }

    pub fn open_auth_modal(&mut self, tab: AuthTab, view: &mut ViewModel) {
        view.modals.auth = Some(tab);
        view.auth_error = None;
        view.confirm_required = tab == AuthTab::Register;
    }

    pub fn close_auth_modal(&mut self, view: &mut ViewModel) {
        view.modals.auth = None;
    }

    /// 현재 탭 기준으로 로그인/회원가입을 제출합니다.
    /// 입력 검증에 실패하면 서버로 보내지 않습니다.
    pub async fn submit(&mut self, form: &AuthForm, backend: &dyn Backend, view: &mut ViewModel) {
        let Some(tab) = view.modals.auth else {
            return;
        };
        let email = form.email.trim();

        if let Err(message) = validate_auth_form(tab, email, form) {
            view.auth_error = Some(message.to_string());
            return;
        }

        let outcome = match tab {
            AuthTab::Register => {
                let req = RegisterRequest {
                    email: email.to_string(),
                    password: form.password.clone(),
                };
                backend.register(&req).await.map(|_| true)
            }
            AuthTab::Login => self.login(email, &form.password, backend, view).await,
        };

        match outcome {
            Ok(true) => {
                self.close_auth_modal(view);
                self.signed_in(backend, view).await;
            }
            // 2단계 코드 대기
            Ok(false) => {}
            Err(err) => view.auth_error = Some(err.to_string()),
        }
    }

    /// 서버가 2단계 코드를 요구하면 `Ok(false)`
    async fn login(
        &mut self,
        email: &str,
        password: &str,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) -> Result<bool, ClientError> {
        // 새로 시도하면 이전 대기 상태는 버립니다.
        self.pending = None;

        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            totp_code: None,
        };
        let resp = backend.login(&req).await?;
        if resp.requires_2fa {
            self.pending = Some(PendingChallenge {
                email: email.to_string(),
                password: password.to_string(),
            });
            view.modals.auth = None;
            view.modals.two_factor = true;
            view.two_factor_error = None;
            return Ok(false);
        }
        Ok(true)
    }

    pub async fn submit_two_factor(
        &mut self,
        code: &str,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) {
        let Some(pending) = self.pending.clone() else {
            return;
        };
        view.two_factor_error = None;

        let code = code.trim();
        if !two_factor::is_well_formed(code) {
            view.two_factor_error = Some("Enter the 6-digit code from your app".to_string());
            return;
        }

        let req = LoginRequest {
            email: pending.email,
            password: pending.password,
            totp_code: Some(code.to_string()),
        };
        match backend.login(&req).await {
            Ok(resp) if resp.requires_2fa => {
                view.two_factor_error = Some("Invalid two-factor code".to_string());
            }
            Ok(_) => {
                self.pending = None;
                view.modals.two_factor = false;
                self.signed_in(backend, view).await;
            }
            Err(err) => view.two_factor_error = Some(err.to_string()),
        }
    }

    pub fn dismiss_two_factor(&mut self, view: &mut ViewModel) {
        self.pending = None;
        view.modals.two_factor = false;
        view.two_factor_error = None;
    }

    async fn signed_in(&mut self, backend: &dyn Backend, view: &mut ViewModel) {
        self.refresh(backend, view).await;
        view.modals.rate_limit = false;
    }

    /// 서버 응답과 관계없이 로컬 사용자 정보는 지웁니다.
    pub async fn logout(&mut self, backend: &dyn Backend, view: &mut ViewModel) {
        if let Err(err) = backend.logout().await {
            tracing::debug!(error = %err, "logout request failed");
        }
        self.pending = None;
        self.set_state(SessionState::Guest, view);
    }

    pub fn open_rate_limit_modal(&mut self, view: &mut ViewModel) {
        view.modals.rate_limit = true;
    }

    pub fn close_rate_limit_modal(&mut self, view: &mut ViewModel) {
        view.modals.rate_limit = false;
    }

    /// 한도 초과 안내 창의 "Sign up" / "Log in" 버튼
    pub fn rate_limit_to_auth(&mut self, tab: AuthTab, view: &mut ViewModel) {
        self.close_rate_limit_modal(view);
        self.open_auth_modal(tab, view);
    }

    pub fn toggle_profile_dropdown(&mut self, view: &mut ViewModel) {
        view.profile_dropdown_open = !view.profile_dropdown_open;
    }

    /// 페이지 클릭. 프로필 영역 밖을 누르면 드롭다운을 닫습니다.
    pub fn page_click(&mut self, inside_profile: bool, view: &mut ViewModel) {
        if !inside_profile {
            view.profile_dropdown_open = false;
        }
    }

    /// 비로그인이면 아무것도 하지 않습니다.
    pub fn open_settings(&mut self, view: &mut ViewModel) {
        let Some(user) = self.user() else {
            return;
        };
        view.settings = Some(SettingsView::from_snapshot(user));
        view.settings_feedback = Default::default();
        view.two_factor_enrollment = None;
        view.profile_dropdown_open = false;
        view.modals.settings = true;
    }

    pub fn close_settings(&mut self, view: &mut ViewModel) {
        view.modals.settings = false;
    }
}

fn validate_auth_form(tab: AuthTab, email: &str, form: &AuthForm) -> Result<(), &'static str> {
    if email.is_empty() || form.password.is_empty() {
        return Err("Email and password are required");
    }
    if tab == AuthTab::Register {
        if form.password != form.confirm {
            return Err("Passwords do not match");
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters");
        }
    }
    Ok(())
}
