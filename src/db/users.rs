use crate::error::AppError;
use crate::models::user::User;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = r#"
    id, email, password_hash, email_verified, phone, phone_verified,
    totp_secret, totp_enabled, plan, created_at, updated_at
"#;

/// `users.email` UNIQUE 위반은 409로 바꿉니다.
/// 중복 확인 후 INSERT 사이에 다른 요청이 먼저 가입해도 500이 아닌 409가 나갑니다.
fn email_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email already registered".to_string())
        }
        _ => AppError::Database(e),
    }
}

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(email_conflict)?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

/// 주소를 바꾸면 인증 여부는 항상 초기화됩니다.
pub async fn update_email(pool: &SqlitePool, id: &str, email: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET email = ?, email_verified = 0,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(email)
    .bind(id)
    .execute(pool)
    .await
    .map_err(email_conflict)?;

    // 이전 주소로 보낸 코드로 새 주소를 인증할 수 없게 지웁니다.
    sqlx::query("DELETE FROM verification_codes WHERE user_id = ? AND channel = 'email'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn update_password(
    pool: &SqlitePool,
    id: &str,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_email_verified(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET email_verified = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// 전화번호 저장. 기존과 다른 번호면 미인증 상태가 됩니다.
pub async fn update_phone(pool: &SqlitePool, id: &str, phone: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET phone_verified = CASE WHEN phone = ? THEN phone_verified ELSE 0 END,
            phone = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(phone)
    .bind(phone)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_phone_verified(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET phone_verified = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// 새 TOTP 비밀키 저장. `enable_totp` 전까지는 비활성입니다.
pub async fn store_totp_secret(pool: &SqlitePool, id: &str, secret: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET totp_secret = ?, totp_enabled = 0,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(secret)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn enable_totp(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET totp_enabled = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND totp_secret IS NOT NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn disable_totp(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET totp_secret = NULL, totp_enabled = 0,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_plan(pool: &SqlitePool, id: &str, plan: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET plan = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(plan)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
