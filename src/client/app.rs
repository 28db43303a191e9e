use std::{ops::Range, sync::Arc};

use crate::models::{Tone, TransformKind, PLANS};

use super::api::Backend;
use super::billing::{BillingController, CheckoutOutcome};
use super::editor::Editor;
use super::i18n::Catalog;
use super::session::{AuthController, AuthForm};
use super::settings::{ChangeEmailForm, ChangePasswordForm, DisableTwoFactorForm};
use super::storage::{self, KeyValueStore, TERMS_KEY};
use super::transform::{Refusal, TransformController};
use super::view::ViewModel;

/// 페이지 전체: 편집기, 컨트롤러들, 그리고 컨트롤러가 쓰는 화면 상태
pub struct App {
    backend: Arc<dyn Backend>,
    store: Box<dyn KeyValueStore>,
    catalog: Box<dyn Catalog>,
    client_id: String,
    pub editor: Editor,
    pub transforms: TransformController,
    pub auth: AuthController,
    pub billing: BillingController,
    pub view: ViewModel,
}

impl App {
    /// `store`에서 편집기 내용과 약관 동의 여부를 복원하고 클라이언트 ID를 준비합니다.
    /// 서버 요청은 [`App::load`]에서 처음 보냅니다.
    pub fn new(
        backend: Arc<dyn Backend>,
        mut store: Box<dyn KeyValueStore>,
        catalog: Box<dyn Catalog>,
    ) -> Self {
        let editor = Editor::restore(store.as_ref());
        let client_id = storage::client_id(store.as_mut());

        let mut view = ViewModel {
            terms_accepted: store.get(TERMS_KEY).as_deref() == Some("1"),
            ..Default::default()
        };
        view.update_char_count(editor.char_count(), catalog.as_ref());

        Self {
            backend,
            store,
            catalog,
            client_id,
            editor,
            transforms: TransformController::new(),
            auth: AuthController::new(),
            billing: BillingController::new(PLANS.iter().map(|plan| (plan.id, plan.name))),
            view,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// 페이지 로드: 로그인 상태와 플랜 배지
    pub async fn load(&mut self) {
        self.auth.refresh(self.backend.as_ref(), &mut self.view).await;

        match self.backend.subscription_status(Some(self.client_id.as_str())).await {
            Ok(quota) => self
                .view
                .update_plan_badge(Some(&quota), self.catalog.as_ref()),
            Err(err) => tracing::debug!(error = %err, "subscription status unavailable"),
        }
    }

    pub fn type_text(&mut self, content: impl Into<String>) {
        self.editor.set_content(content);
        self.editor.persist(self.store.as_mut());
        self.view
            .update_char_count(self.editor.char_count(), self.catalog.as_ref());
    }

    pub fn select(&mut self, range: Range<usize>) {
        self.editor.select(range);
    }

    /// 선택기가 잠겨 있거나 목록에 없는 값이면 무시합니다.
    pub fn choose_tone(&mut self, value: &str) -> bool {
        if self.view.controls_disabled {
            return false;
        }
        let Some(tone) = Tone::parse(value) else {
            return false;
        };
        self.editor.set_tone(tone);
        self.editor.persist(self.store.as_mut());
        true
    }

    pub async fn transform(&mut self, kind: TransformKind) -> Result<(), Refusal> {
        self.transforms
            .run(
                kind,
                &self.editor,
                self.backend.as_ref(),
                Some(self.client_id.as_str()),
                self.catalog.as_ref(),
                &mut self.view,
            )
            .await
    }

    pub fn apply_suggestion(&mut self) -> bool {
        let applied = self
            .transforms
            .apply(&mut self.editor, self.catalog.as_ref(), &mut self.view);
        if applied {
            self.editor.persist(self.store.as_mut());
        }
        applied
    }

    pub fn accept_terms(&mut self) {
        self.store.set(TERMS_KEY, "1");
        self.view.terms_accepted = true;
        self.view.terms_denied_notice = false;
    }

    pub fn deny_terms(&mut self) {
        self.view.terms_denied_notice = true;
    }

    pub async fn checkout(&mut self, plan: &str) -> CheckoutOutcome {
        self.billing
            .checkout(
                plan,
                self.backend.as_ref(),
                self.catalog.as_ref(),
                &mut self.view,
            )
            .await
    }

    pub async fn submit_auth(&mut self, form: &AuthForm) {
        self.auth
            .submit(form, self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn submit_two_factor(&mut self, code: &str) {
        self.auth
            .submit_two_factor(code, self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn logout(&mut self) {
        self.auth.logout(self.backend.as_ref(), &mut self.view).await;
    }

    pub async fn change_email(&mut self, form: &mut ChangeEmailForm) {
        self.auth
            .change_email(
                form,
                self.backend.as_ref(),
                self.catalog.as_ref(),
                &mut self.view,
            )
            .await;
    }

    pub async fn change_password(&mut self, form: &mut ChangePasswordForm) {
        self.auth
            .change_password(
                form,
                self.backend.as_ref(),
                self.catalog.as_ref(),
                &mut self.view,
            )
            .await;
    }

    pub async fn request_email_code(&mut self) {
        self.auth
            .request_email_code(self.backend.as_ref(), self.catalog.as_ref(), &mut self.view)
            .await;
    }

    pub async fn verify_email(&mut self, code: &mut String) {
        self.auth
            .verify_email(code, self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn request_phone_code(&mut self, phone: &str) {
        self.auth
            .request_phone_code(
                phone,
                self.backend.as_ref(),
                self.catalog.as_ref(),
                &mut self.view,
            )
            .await;
    }

    pub async fn verify_phone(&mut self, code: &mut String) {
        self.auth
            .verify_phone(code, self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn setup_two_factor(&mut self) {
        self.auth
            .setup_two_factor(self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn enable_two_factor(&mut self, code: &mut String) {
        self.auth
            .enable_two_factor(code, self.backend.as_ref(), &mut self.view)
            .await;
    }

    pub async fn disable_two_factor(&mut self, form: &mut DisableTwoFactorForm) {
        self.auth
            .disable_two_factor(form, self.backend.as_ref(), &mut self.view)
            .await;
    }
}
