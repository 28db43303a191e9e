//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 라우트 핸들러(routes/)와 서비스(services/)가 호출하는 SQL 쿼리 함수들입니다.
//!
//! 각 하위 모듈:
//! - `usage`: 일일 사용량 카운터 (무료 한도 계산)
//! - `users`: 사용자 계정 조회/수정
//! - `verification`: 이메일/전화 인증 코드

pub mod usage;
pub mod users;
pub mod verification;

pub use usage::*;
