//! # TOTP 2단계 인증
//!
//! RFC 6238: SHA-1, 6자리, 30초 간격, 앞뒤 1구간까지 허용합니다.
//! 비밀키는 base32로 인코딩하여 `users.totp_secret`에 저장합니다.
//!
//! 계정 이름(이메일)은 등록용 otpauth URL에만 쓰이고, 코드 검증은 비밀키만으로 합니다.
//! totp-rs의 `TOTP::new`는 `:`가 들어간 계정 이름을 거부하므로 `new_unchecked`를 사용합니다.

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::AppError;
use crate::models::TwoFactorSetup;

pub const CODE_DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP_SECONDS: u64 = 30;

/// 새 160비트 비밀키 (base32)
pub fn generate_secret() -> Result<String, AppError> {
    match Secret::generate_secret().to_encoded() {
        Secret::Encoded(encoded) => Ok(encoded),
        Secret::Raw(_) => Err(AppError::Internal(
            "TOTP secret could not be encoded".to_string(),
        )),
    }
}

fn totp(secret: &str, issuer: Option<&str>, account: &str) -> Result<TOTP, AppError> {
    let bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|e| AppError::Internal(format!("Stored TOTP secret is invalid: {:?}", e)))?;

    Ok(TOTP::new_unchecked(
        Algorithm::SHA1,
        CODE_DIGITS,
        SKEW,
        STEP_SECONDS,
        bytes,
        issuer.map(str::to_string),
        account.to_string(),
    ))
}

/// 인증 앱이 스캔할 otpauth URL과 QR 이미지(data URL)
pub fn enrollment(secret: &str, issuer: &str, account: &str) -> Result<TwoFactorSetup, AppError> {
    let totp = totp(secret, Some(issuer), account)?;
    let qr = totp
        .get_qr_base64()
        .map_err(|e| AppError::Internal(format!("QR generation failed: {}", e)))?;

    Ok(TwoFactorSetup {
        secret: secret.to_string(),
        otpauth_url: totp.get_url(),
        qr_data_url: format!("data:image/png;base64,{}", qr),
    })
}

/// 숫자 6자리만 비밀키와 대조합니다.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

/// 현재 시간 구간 기준으로 `code`를 검증합니다.
pub fn verify_code(secret: &str, code: &str) -> Result<bool, AppError> {
    let code = code.trim();
    if !is_well_formed(code) {
        return Ok(false);
    }

    totp(secret, None, "")?
        .check_current(code)
        .map_err(|e| AppError::Internal(format!("System clock error: {}", e)))
}
