//! # 설정 창
//!
//! 표시 내용은 사용자 스냅샷에서만 계산합니다. 변경 동작은 모두 같은 순서를 따릅니다:
//! 필수값 확인, 요청, 결과 표시, 비밀번호 입력 지우기, 스냅샷 다시 읽기

use crate::models::{ChangeEmailRequest, ChangePasswordRequest, DisableTwoFactorRequest, UserSnapshot};
use crate::services::password::MIN_PASSWORD_LEN;

use super::api::{Backend, ClientError};
use super::i18n::Catalog;
use super::session::{AuthController, SessionState};
use super::view::{Feedback, ViewModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub email: String,
    pub email_verified: bool,
    pub show_request_email_code: bool,
    /// 미리 채운 전화번호 입력
    pub phone: String,
    pub phone_verified: bool,
    pub show_request_phone_code: bool,
    /// 번호가 저장된 뒤 보이는 전화 인증 코드 입력
    pub show_phone_flow: bool,
    pub two_factor_enabled: bool,
    pub show_setup_two_factor: bool,
    pub show_disable_two_factor: bool,
}

impl SettingsView {
    pub fn from_snapshot(user: &UserSnapshot) -> Self {
        Self {
            email: user.email.clone(),
            email_verified: user.email_verified,
            show_request_email_code: !user.email_verified,
            phone: user.phone.clone().unwrap_or_default(),
            phone_verified: user.phone_verified,
            show_request_phone_code: !user.phone_verified,
            show_phone_flow: user.phone.as_deref().is_some_and(|p| !p.is_empty()),
            two_factor_enabled: user.totp_enabled,
            show_setup_two_factor: !user.totp_enabled,
            show_disable_two_factor: user.totp_enabled,
        }
    }

    /// `✓ Verified` 배지 문구. 미인증이면 빈 문자열
    pub fn badge(verified: bool, catalog: &dyn Catalog) -> String {
        if verified {
            format!("✓ {}", catalog.tr("verified"))
        } else {
            String::new()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangeEmailForm {
    pub new_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current: String,
    pub new_password: String,
    pub confirm: String,
}

#[derive(Debug, Clone, Default)]
pub struct DisableTwoFactorForm {
    pub code: String,
    pub password: String,
}

fn report(feedback: &mut Feedback, err: ClientError) {
    feedback.fail(err.to_string());
}

impl AuthController {
    fn adopt(&mut self, user: UserSnapshot, view: &mut ViewModel) {
        self.set_state(SessionState::Authenticated(user), view);
    }

    pub async fn change_email(
        &mut self,
        form: &mut ChangeEmailForm,
        backend: &dyn Backend,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) {
        let feedback = &mut view.settings_feedback.change_email;
        feedback.clear();
        let new_email = form.new_email.trim().to_string();
        if new_email.is_empty() {
            return feedback.fail("Enter new email");
        }
        if form.password.is_empty() {
            return feedback.fail("Password required");
        }

        let req = ChangeEmailRequest {
            new_email,
            password: form.password.clone(),
        };
        match backend.change_email(&req).await {
            Ok(user) => {
                *form = ChangeEmailForm::default();
                self.adopt(user, view);
                view.settings_feedback
                    .change_email
                    .succeed(catalog.tr("emailChanged"));
            }
            Err(err) => report(&mut view.settings_feedback.change_email, err),
        }
    }

    pub async fn change_password(
        &mut self,
        form: &mut ChangePasswordForm,
        backend: &dyn Backend,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) {
        let feedback = &mut view.settings_feedback.change_password;
        feedback.clear();
        if form.current.is_empty() {
            return feedback.fail("Current password required");
        }
        if form.new_password.chars().count() < MIN_PASSWORD_LEN {
            return feedback.fail("New password must be at least 6 characters");
        }
        if form.new_password != form.confirm {
            return feedback.fail("Passwords do not match");
        }

        let req = ChangePasswordRequest {
            current_password: form.current.clone(),
            new_password: form.new_password.clone(),
        };
        match backend.change_password(&req).await {
            Ok(()) => {
                *form = ChangePasswordForm::default();
                feedback.succeed(catalog.tr("passwordChanged"));
            }
            Err(err) => report(feedback, err),
        }
    }

    pub async fn request_email_code(
        &mut self,
        backend: &dyn Backend,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.email_verification.clear();
        match backend.request_email_code().await {
            Ok(()) => {
                view.email_code_sent = true;
                view.settings_feedback
                    .email_verification
                    .succeed(catalog.tr("codeSent"));
            }
            Err(err) => report(&mut view.settings_feedback.email_verification, err),
        }
    }

    pub async fn verify_email(
        &mut self,
        code: &mut String,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.email_verification.clear();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return view.settings_feedback.email_verification.fail("Enter the code");
        }
        match backend.verify_email(trimmed).await {
            Ok(_) => {
                code.clear();
                view.email_code_sent = false;
                self.refresh(backend, view).await;
            }
            Err(err) => report(&mut view.settings_feedback.email_verification, err),
        }
    }

    pub async fn request_phone_code(
        &mut self,
        phone: &str,
        backend: &dyn Backend,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.phone_verification.clear();
        let phone = phone.trim();
        if phone.is_empty() {
            return view
                .settings_feedback
                .phone_verification
                .fail("Phone number required");
        }
        match backend.request_phone_code(phone).await {
            Ok(()) => {
                // 저장된 번호가 바뀌었으니 코드 입력 줄을 띄우기 전에 다시 읽습니다.
                self.refresh(backend, view).await;
                view.phone_code_sent = true;
                view.settings_feedback
                    .phone_verification
                    .succeed(catalog.tr("codeSent"));
            }
            Err(err) => report(&mut view.settings_feedback.phone_verification, err),
        }
    }

    pub async fn verify_phone(
        &mut self,
        code: &mut String,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.phone_verification.clear();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return view.settings_feedback.phone_verification.fail("Enter the code");
        }
        match backend.verify_phone(trimmed).await {
            Ok(_) => {
                code.clear();
                view.phone_code_sent = false;
                self.refresh(backend, view).await;
            }
            Err(err) => report(&mut view.settings_feedback.phone_verification, err),
        }
    }

    pub async fn setup_two_factor(&mut self, backend: &dyn Backend, view: &mut ViewModel) {
        view.settings_feedback.two_factor.clear();
        match backend.setup_two_factor().await {
            Ok(enrollment) => view.two_factor_enrollment = Some(enrollment),
            Err(err) => report(&mut view.settings_feedback.two_factor, err),
        }
    }

    pub async fn enable_two_factor(
        &mut self,
        code: &mut String,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.two_factor.clear();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return view
                .settings_feedback
                .two_factor
                .fail("Enter the 6-digit code from your app");
        }
        match backend.enable_two_factor(trimmed).await {
            Ok(_) => {
                code.clear();
                view.two_factor_enrollment = None;
                self.refresh(backend, view).await;
            }
            Err(err) => report(&mut view.settings_feedback.two_factor, err),
        }
    }

    pub async fn disable_two_factor(
        &mut self,
        form: &mut DisableTwoFactorForm,
        backend: &dyn Backend,
        view: &mut ViewModel,
    ) {
        view.settings_feedback.two_factor.clear();
        if form.code.trim().is_empty() || form.password.is_empty() {
            return view
                .settings_feedback
                .two_factor
                .fail("Code and password are required");
        }
        let req = DisableTwoFactorRequest {
            code: form.code.trim().to_string(),
            password: form.password.clone(),
        };
        match backend.disable_two_factor(&req).await {
            Ok(_) => {
                *form = DisableTwoFactorForm::default();
                self.refresh(backend, view).await;
            }
            Err(err) => report(&mut view.settings_feedback.two_factor, err),
        }
    }
}
