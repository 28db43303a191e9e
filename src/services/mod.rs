//! # 서비스 계층
//!
//! 라우트 핸들러에서 쓰는 비즈니스 로직과 외부 서비스 연동입니다.
//! - `checkout`: Stripe 호스티드 결제 세션
//! - `llm`: 언어 모델(chat completion) 호출
//! - `password`: Argon2id 비밀번호 해싱
//! - `prompts`: 변환 종류별 시스템 지시문
//! - `quota`: 무료 사용량 한도
//! - `two_factor`: TOTP 2단계 인증
//! - `verification`: 이메일/전화 인증 코드

pub mod checkout;
pub mod llm;
pub mod password;
pub mod prompts;
pub mod quota;
pub mod two_factor;
pub mod verification;
