use super::api::Backend;
use super::i18n::Catalog;
use super::view::{StatusKind, ViewModel};

/// 가격표 버튼 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanButton {
    pub plan: String,
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// 호스팅 결제 페이지로 이동
    Navigate(String),
    Failed,
}

#[derive(Debug, Default)]
pub struct BillingController {
    pub buttons: Vec<PlanButton>,
}

impl BillingController {
    pub fn new<'a>(plans: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            buttons: plans
                .into_iter()
                .map(|(plan, label)| PlanButton {
                    plan: plan.to_string(),
                    label: label.to_string(),
                    disabled: false,
                })
                .collect(),
        }
    }

    pub fn button(&self, plan: &str) -> Option<&PlanButton> {
        self.buttons.iter().find(|button| button.plan == plan)
    }

    fn set_button(&mut self, plan: &str, label: Option<String>, disabled: bool) -> Option<String> {
        let button = self.buttons.iter_mut().find(|button| button.plan == plan)?;
        button.disabled = disabled;
        label.map(|label| std::mem::replace(&mut button.label, label))
    }

    /// 플랜 버튼 클릭. 요청하는 동안 버튼에 로딩 문구를 띄우고
    /// 끝나면 원래 문구로 되돌립니다.
    pub async fn checkout(
        &mut self,
        plan: &str,
        backend: &dyn Backend,
        catalog: &dyn Catalog,
        view: &mut ViewModel,
    ) -> CheckoutOutcome {
        let original = self.set_button(plan, Some(catalog.tr("loading")), true);

        let result = backend.create_checkout(plan).await;

        self.set_button(plan, original, false);

        match result {
            Ok(url) => CheckoutOutcome::Navigate(url),
            Err(err) => {
                let message = err.to_string();
                tracing::debug!(plan, error = %message, "checkout failed");
                if message.contains("STRIPE") {
                    view.stripe_help_open = true;
                }
                view.set_status(message, StatusKind::Error);
                CheckoutOutcome::Failed
            }
        }
    }
}
