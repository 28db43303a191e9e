//! # 텍스트 변환 요청/응답 타입

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 호출자의 플랜. 변환 성공 응답마다 붙습니다.
pub const SUBSCRIPTION_PLAN_HEADER: &str = "x-subscription-plan";
/// 오늘 남은 변환 횟수. 무제한 플랜이면 없음
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// 429 응답에만 붙고, 값은 한도가 찬 등급입니다.
pub const RATE_LIMIT_REACHED_HEADER: &str = "x-rate-limit-reached";
/// 비회원에게 가입을 안내하는 `x-rate-limit-reached` 값
pub const GUEST_TIER: &str = "free";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Complete,
    Rewrite,
    Grammar,
    Summarize,
    Expand,
    Bullets,
    Simplify,
    Paraphrase,
    Outline,
}

impl TransformKind {
    pub const ALL: [TransformKind; 9] = [
        TransformKind::Complete,
        TransformKind::Rewrite,
        TransformKind::Grammar,
        TransformKind::Summarize,
        TransformKind::Expand,
        TransformKind::Bullets,
        TransformKind::Simplify,
        TransformKind::Paraphrase,
        TransformKind::Outline,
    ];

    /// `/api/` 아래 경로
    pub fn as_str(self) -> &'static str {
        match self {
            TransformKind::Complete => "complete",
            TransformKind::Rewrite => "rewrite",
            TransformKind::Grammar => "grammar",
            TransformKind::Summarize => "summarize",
            TransformKind::Expand => "expand",
            TransformKind::Bullets => "bullets",
            TransformKind::Simplify => "simplify",
            TransformKind::Paraphrase => "paraphrase",
            TransformKind::Outline => "outline",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// rewrite 문체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Formal,
    Casual,
    Concise,
    Elaborate,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Casual, Tone::Concise, Tone::Elaborate];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Concise => "concise",
            Tone::Elaborate => "elaborate",
        }
    }

    /// 서버용 관대한 조회. 모르는 값은 `None`이고
    /// 호출한 쪽이 기본값을 고릅니다.
    pub fn parse(value: &str) -> Option<Tone> {
        Tone::ALL.into_iter().find(|tone| tone.as_str() == value)
    }
}

/// `POST /api/{kind}` 본문
///
/// `tone`은 문자열 그대로 받습니다. 모르는 값도 역직렬화에서 실패하지 않고
/// 서버까지 와서 기본값으로 바뀌어야 합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// 호출자의 플랜과 남은 횟수. `remaining == -1`이면 무제한
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub plan: String,
    pub remaining: i64,
}

impl Quota {
    pub const UNLIMITED: i64 = -1;

    pub fn is_unlimited(&self) -> bool {
        self.remaining < 0
    }
}

/// 변환 응답. `completion` / `text` 중 정확히 하나만 채웁니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<Quota>,
}

impl TransformResponse {
    pub fn new(kind: TransformKind, output: String, quota: Option<Quota>) -> Self {
        match kind {
            TransformKind::Complete => Self {
                completion: Some(output),
                text: None,
                quota,
            },
            _ => Self {
                completion: None,
                text: Some(output),
                quota,
            },
        }
    }

    /// `kind`가 응답하는 키에서 읽은 결과
    pub fn output(&self, kind: TransformKind) -> Option<&str> {
        match kind {
            TransformKind::Complete => self.completion.as_deref(),
            _ => self.text.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_path_segments() {
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>(), Ok(kind));
        }
        assert!("translate".parse::<TransformKind>().is_err());
    }

    #[test]
    fn only_complete_answers_under_completion() {
        let body = serde_json::to_value(TransformResponse::new(
            TransformKind::Complete,
            "mat.".into(),
            None,
        ))
        .unwrap();
        assert_eq!(body, serde_json::json!({ "completion": "mat." }));

        let body = serde_json::to_value(TransformResponse::new(
            TransformKind::Outline,
            "- a".into(),
            None,
        ))
        .unwrap();
        assert_eq!(body, serde_json::json!({ "text": "- a" }));
    }

    #[test]
    fn unknown_tone_is_not_parsed() {
        assert_eq!(Tone::parse("casual"), Some(Tone::Casual));
        assert_eq!(Tone::parse("sarcastic"), None);
    }
}
