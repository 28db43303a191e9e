//! 라우트 핸들러가 함께 쓰는 요청 추출기(extractor)

pub mod auth;
pub mod json;
