//! # 화면 상태(ViewModel)
//!
//! 컨트롤러가 쓰고 렌더러가 읽습니다.

use crate::models::{Quota, TwoFactorSetup};

use super::i18n::Catalog;
use super::settings::SettingsView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusKind {
    #[default]
    Plain,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

/// 클릭해서 적용하는 결과 패널
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionPanel {
    pub hint: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    Login,
    Register,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modals {
    /// 로그인/회원가입 창과 현재 탭
    pub auth: Option<AuthTab>,
    /// 6자리 2단계 코드 입력 창
    pub two_factor: bool,
    /// "오늘 한도 초과, 가입하세요" 안내 창
    pub rate_limit: bool,
    pub settings: bool,
}

/// 폼 하나의 에러/성공 문구
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Feedback {
    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.success = None;
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.error = None;
        self.success = Some(message.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsFeedback {
    pub change_email: Feedback,
    pub change_password: Feedback,
    pub email_verification: Feedback,
    pub phone_verification: Feedback,
    pub two_factor: Feedback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub status: Status,
    pub suggestion: Option<SuggestionPanel>,
    /// 모든 변환 버튼과 톤 선택기
    pub controls_disabled: bool,
    pub char_count: String,
    pub plan_badge: Option<String>,

    pub modals: Modals,
    pub auth_error: Option<String>,
    /// 비밀번호 확인 칸 표시 여부 (회원가입 탭)
    pub confirm_required: bool,
    pub two_factor_error: Option<String>,
    /// 로그인 시 헤더에 보이는 이메일. `None`이면 비로그인 화면
    pub signed_in_as: Option<String>,
    pub profile_dropdown_open: bool,

    pub settings: Option<SettingsView>,
    pub settings_feedback: SettingsFeedback,
    /// 코드를 요청한 뒤 나타나는 코드 입력 줄
    pub email_code_sent: bool,
    pub phone_code_sent: bool,
    /// setup과 enable 사이의 등록 정보 (QR 코드, 비밀키)
    pub two_factor_enrollment: Option<TwoFactorSetup>,

    pub terms_accepted: bool,
    pub terms_denied_notice: bool,
    pub stripe_help_open: bool,
}

impl ViewModel {
    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Status {
            text: text.into(),
            kind,
        };
    }

    pub fn update_char_count(&mut self, count: usize, catalog: &dyn Catalog) {
        self.char_count = if count == 1 {
            format!("1 {}", catalog.tr("charCountOne"))
        } else {
            format!("{} {}", count, catalog.tr("charCount"))
        };
    }

    /// 무제한이면 `starter plan`, 아니면 `free: 3 left`
    pub fn update_plan_badge(&mut self, quota: Option<&Quota>, catalog: &dyn Catalog) {
        self.plan_badge = quota.filter(|q| !q.plan.is_empty()).map(|q| {
            if q.is_unlimited() {
                format!("{} {}", q.plan, catalog.tr("plan"))
            } else {
                format!("{}: {} {}", q.plan, q.remaining, catalog.tr("left"))
            }
        });
    }
}
