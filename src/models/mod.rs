//! # 데이터 모델 모듈
//!
//! 서버와 클라이언트 라이브러리가 함께 쓰는 요청/응답 구조체들을 정의합니다.
//! - `billing`: 구독 플랜 카탈로그와 결제(checkout) 요청/응답
//! - `transform`: 텍스트 변환 종류, 톤, 변환 요청/응답, 사용량(quota)
//! - `user`: 사용자 계정, 로그인/회원가입, 설정 변경 요청
//!
//! `pub use X::*;`로 재공개하여 `crate::models::UserSnapshot`처럼 짧게 접근합니다.

pub mod billing;
pub mod transform;
pub mod user;

pub use billing::*;
pub use transform::*;
pub use user::*;
