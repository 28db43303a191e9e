use serde::{Deserialize, Serialize};

/// 고정 요금표의 구독 등급 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// 가격 (USD 센트)
    pub price: i64,
    pub interval: &'static str,
}

pub const STARTER: Plan = Plan {
    id: "starter",
    name: "Starter",
    price: 600,
    interval: "month",
};

pub const PRO: Plan = Plan {
    id: "pro",
    name: "Pro",
    price: 1200,
    interval: "month",
};

pub const TEAM: Plan = Plan {
    id: "team",
    name: "Team",
    price: 2400,
    interval: "month",
};

pub const PLANS: [Plan; 3] = [STARTER, PRO, TEAM];

/// 결제한 적 없는 계정의 플랜
pub const FREE_PLAN: &str = "free";

impl Plan {
    /// 요금표 조회. 모르거나 없는 ID는 starter 플랜
    pub fn lookup(id: Option<&str>) -> Plan {
        id.and_then(|id| PLANS.into_iter().find(|plan| plan.id == id))
            .unwrap_or(STARTER)
    }

    /// `id`가 유료 등급인지
    pub fn is_paid(id: &str) -> bool {
        PLANS.iter().any(|plan| plan.id == id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutRequest {
    pub session_id: String,
}
