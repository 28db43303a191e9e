//! # 언어 모델(Chat Completions) 호출
//!
//! 변환 하나가 호출 한 번입니다: 고정 시스템 지시문, 사용자 텍스트, 고정 temperature.
//! OpenAI 구현은 reqwest로 `/chat/completions` 엔드포인트를 호출합니다.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 모델 출력(앞뒤 공백 제거). 빈 문자열도 정상 응답입니다.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    completions_url: String,
}

impl OpenAiProvider {
    /// `api_key`가 `None`이어도 서버는 뜹니다. 호출마다
    /// 빠진 환경 변수 이름을 담은 에러를 돌려줍니다.
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(
                "OPENAI_API_KEY is not set. Add it to .env",
            ))?;

        let body = wire::ChatRequest {
            model: &self.model,
            messages: [
                wire::Message {
                    role: "system",
                    content: system,
                },
                wire::Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let resp = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<wire::ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("Language model request failed with HTTP {}", status.as_u16()));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: wire::ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // choices나 content가 없으면 에러가 아니라 빈 응답
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default())
    }
}

mod wire {
    use super::*;

    #[derive(Serialize)]
    pub struct ChatRequest<'a> {
        pub model: &'a str,
        pub messages: [Message<'a>; 2],
        pub temperature: f32,
    }

    #[derive(Serialize)]
    pub struct Message<'a> {
        pub role: &'a str,
        pub content: &'a str,
    }

    #[derive(Deserialize)]
    pub struct ChatResponse {
        #[serde(default)]
        pub choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    pub struct Choice {
        pub message: ChoiceMessage,
    }

    #[derive(Deserialize)]
    pub struct ChoiceMessage {
        pub content: Option<String>,
    }

    #[derive(Deserialize)]
    pub struct ErrorEnvelope {
        pub error: ErrorBody,
    }

    #[derive(Deserialize)]
    pub struct ErrorBody {
        pub message: String,
    }
}
