mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{totp_now, wrong_code, TestApp};
use wordsmith::{
    db::users as db_users,
    error::AppError,
    services::{
        password,
        verification::{Channel, MAX_ATTEMPTS},
    },
};

#[tokio::test]
async fn register_signs_in_and_me_reflects_it() {
    let mut app = TestApp::new().await;

    let me = app.get("/api/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert!(me.body["user"].is_null());

    let resp = app.register("  Ada@Example.com ", "hunter22").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["email"], "ada@example.com");
    assert_eq!(resp.body["user"]["plan"], "free");
    assert_eq!(resp.body["user"]["emailVerified"], false);
    assert_eq!(resp.body["user"]["totpEnabled"], false);
    assert!(resp.body["user"].get("passwordHash").is_none());

    let me = app.get("/api/me").await;
    assert_eq!(me.body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn registration_is_validated() {
    let mut app = TestApp::new().await;

    let resp = app.register("", "hunter22").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Email and password are required");

    let resp = app.register("not-an-email", "hunter22").await;
    assert_eq!(resp.error(), "Invalid email address");

    let resp = app.register("a:b@example.com", "hunter22").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid email address");

    let resp = app.register("ada@example.com", "short").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("6"));

    app.register("ada@example.com", "hunter22").await;
    app.clear_cookies();
    let resp = app.register("ADA@example.com", "another1").await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error(), "Email already registered");
}

#[tokio::test]
async fn login_and_logout() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;
    app.post_empty("/api/logout").await;
    assert!(app.get("/api/me").await.body["user"].is_null());

    let resp = app
        .post(
            "/api/login",
            json!({ "email": "ada@example.com", "password": "wrong-one" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Invalid email or password");

    let resp = app
        .post(
            "/api/login",
            json!({ "email": "nobody@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.error(), "Invalid email or password");

    let resp = app
        .post(
            "/api/login",
            json!({ "email": "Ada@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["email"], "ada@example.com");
    assert!(resp.body.get("requires2FA").is_none());
    assert_eq!(app.get("/api/me").await.body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn account_routes_require_a_session() {
    let mut app = TestApp::new().await;

    for (uri, body) in [
        ("/api/change-password", json!({ "currentPassword": "a", "newPassword": "bbbbbb" })),
        ("/api/verify/request-email", json!({})),
        ("/api/2fa/enable", json!({ "code": "123456" })),
    ] {
        let resp = app.post(uri, body).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(resp.error(), "Not signed in");
    }
    assert_eq!(app.get("/api/2fa/setup").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn two_factor_enrollment_and_login() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    let setup = app.get("/api/2fa/setup").await;
    assert_eq!(setup.status, StatusCode::OK);
    let secret = setup.body["secret"].as_str().unwrap().to_string();
    assert!(setup.body["otpauthUrl"]
        .as_str()
        .unwrap()
        .starts_with("otpauth://totp/"));
    assert!(setup.body["qrDataUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let code = totp_now(&secret);
    let resp = app.post("/api/2fa/enable", json!({ "code": wrong_code(&code) })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid code");

    let resp = app.post("/api/2fa/enable", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["totpEnabled"], true);

    let resp = app.get("/api/2fa/setup").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // 비밀번호만으로는 2단계 코드 요청만 오고 세션은 생기지 않습니다.
    app.post_empty("/api/logout").await;
    let credentials = json!({ "email": "ada@example.com", "password": "hunter22" });
    let resp = app.post("/api/login", credentials.clone()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["requires2FA"], true);
    assert!(resp.body.get("user").is_none());
    assert!(app.get("/api/me").await.body["user"].is_null());

    let resp = app
        .post(
            "/api/login",
            json!({
                "email": "ada@example.com",
                "password": "hunter22",
                "totpCode": wrong_code(&totp_now(&secret)),
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Invalid two-factor code");

    let resp = app
        .post(
            "/api/login",
            json!({
                "email": "ada@example.com",
                "password": "hunter22",
                "totpCode": totp_now(&secret),
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["totpEnabled"], true);

    let resp = app
        .post(
            "/api/2fa/disable",
            json!({ "code": totp_now(&secret), "password": "wrong-one" }),
        )
        .await;
    assert_eq!(resp.error(), "Incorrect password");

    let resp = app
        .post(
            "/api/2fa/disable",
            json!({ "code": totp_now(&secret), "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["totpEnabled"], false);
}

#[tokio::test]
async fn enabling_without_setup_is_refused() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    let resp = app.post("/api/2fa/enable", json!({ "code": "123456" })).await;
    assert_eq!(resp.error(), "Start two-factor setup first");

    let resp = app
        .post("/api/2fa/disable", json!({ "code": "123456", "password": "hunter22" }))
        .await;
    assert_eq!(resp.error(), "Two-factor authentication is not enabled");
}

#[tokio::test]
async fn email_verification_uses_the_delivered_code() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    let resp = app.post("/api/verify/request-email", json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["ok"], true);
    {
        let sent = app.notifier.sent.lock().unwrap();
        assert!(matches!(sent[0].0, Channel::Email));
        assert_eq!(sent[0].1, "ada@example.com");
        assert_eq!(sent[0].2.len(), 6);
    }

    let resp = app.post("/api/verify/email", json!({ "code": "000000x" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid or expired code");

    let code = app.notifier.last_code();
    let resp = app.post("/api/verify/email", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["emailVerified"], true);

    // 코드는 한 번만 쓸 수 있습니다.
    let resp = app.post("/api/verify/email", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app.post("/api/verify/request-email", json!({})).await;
    assert_eq!(resp.error(), "Email already verified");
}

#[tokio::test]
async fn phone_verification_normalizes_the_number() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    let resp = app
        .post("/api/verify/request-phone", json!({ "phone": "555-CALL-NOW" }))
        .await;
    assert_eq!(resp.error(), "Invalid phone number");

    let resp = app
        .post("/api/verify/request-phone", json!({ "phone": " +1 (555) 010-9999 " }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.notifier.sent.lock().unwrap()[0].1, "+15550109999");

    let code = app.notifier.last_code();
    let resp = app.post("/api/verify/phone", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["phone"], "+15550109999");
    assert_eq!(resp.body["user"]["phoneVerified"], true);

    let resp = app
        .post("/api/verify/request-phone", json!({ "phone": "+15550109999" }))
        .await;
    assert_eq!(resp.error(), "Phone already verified");
}

#[tokio::test]
async fn changing_email_resets_verification() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;
    app.post("/api/verify/request-email", json!({})).await;
    let code = app.notifier.last_code();
    app.post("/api/verify/email", json!({ "code": code })).await;

    app.clear_cookies();
    app.register("bob@example.com", "hunter22").await;
    app.post_empty("/api/logout").await;
    app.post(
        "/api/login",
        json!({ "email": "ada@example.com", "password": "hunter22" }),
    )
    .await;

    let resp = app
        .post(
            "/api/change-email",
            json!({ "newEmail": "ada@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.error(), "That is already your email");

    let resp = app
        .post(
            "/api/change-email",
            json!({ "newEmail": "ada@new.example", "password": "nope" }),
        )
        .await;
    assert_eq!(resp.error(), "Incorrect password");

    let resp = app
        .post(
            "/api/change-email",
            json!({ "newEmail": "bob@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = app
        .post(
            "/api/change-email",
            json!({ "newEmail": " Ada@New.example ", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["email"], "ada@new.example");
    assert_eq!(resp.body["user"]["emailVerified"], false);
}

#[tokio::test]
async fn changing_password_requires_the_current_one() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    let resp = app
        .post(
            "/api/change-password",
            json!({ "currentPassword": "wrong-one", "newPassword": "swordfish" }),
        )
        .await;
    assert_eq!(resp.error(), "Current password is incorrect");

    let resp = app
        .post(
            "/api/change-password",
            json!({ "currentPassword": "hunter22", "newPassword": "swordfish" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["ok"], true);

    app.post_empty("/api/logout").await;
    let old = app
        .post(
            "/api/login",
            json!({ "email": "ada@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    let new = app
        .post(
            "/api/login",
            json!({ "email": "ada@example.com", "password": "swordfish" }),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn colon_addresses_from_older_accounts_can_enable_two_factor() {
    let mut app = TestApp::new().await;
    // 가입으로는 만들 수 없는 주소라 DB에 직접 넣습니다.
    let hash = password::hash_password("hunter22").unwrap();
    db_users::create_user(&app.pool, "legacy-1", "a:b@example.com", &hash)
        .await
        .unwrap();

    let credentials = json!({ "email": "a:b@example.com", "password": "hunter22" });
    let resp = app.post("/api/login", credentials).await;
    assert_eq!(resp.status, StatusCode::OK);

    let setup = app.get("/api/2fa/setup").await;
    assert_eq!(setup.status, StatusCode::OK);
    let secret = setup.body["secret"].as_str().unwrap().to_string();

    let resp = app
        .post("/api/2fa/enable", json!({ "code": totp_now(&secret) }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["totpEnabled"], true);

    app.post_empty("/api/logout").await;
    let resp = app
        .post(
            "/api/login",
            json!({
                "email": "a:b@example.com",
                "password": "hunter22",
                "totpCode": totp_now(&secret),
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["email"], "a:b@example.com");
}

#[tokio::test]
async fn verification_code_is_discarded_after_repeated_misses() {
    let mut app = TestApp::new().await;
    app.register("ada@example.com", "hunter22").await;

    app.post("/api/verify/request-email", json!({})).await;
    let code = app.notifier.last_code();
    for _ in 0..MAX_ATTEMPTS {
        let resp = app
            .post("/api/verify/email", json!({ "code": wrong_code(&code) }))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    let resp = app.post("/api/verify/email", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid or expired code");

    // 새 코드는 시도 횟수를 새로 셉니다.
    app.post("/api/verify/request-email", json!({})).await;
    let code = app.notifier.last_code();
    for _ in 0..MAX_ATTEMPTS - 1 {
        app.post("/api/verify/email", json!({ "code": wrong_code(&code) }))
            .await;
    }
    let resp = app.post("/api/verify/email", json!({ "code": code })).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["emailVerified"], true);
}

#[tokio::test]
async fn duplicate_email_writes_are_conflicts() {
    let app = TestApp::new().await;
    let hash = password::hash_password("hunter22").unwrap();

    db_users::create_user(&app.pool, "u-1", "ada@example.com", &hash)
        .await
        .unwrap();
    let err = db_users::create_user(&app.pool, "u-2", "ada@example.com", &hash)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.status(), StatusCode::CONFLICT);

    db_users::create_user(&app.pool, "u-3", "bob@example.com", &hash)
        .await
        .unwrap();
    let err = db_users::update_email(&app.pool, "u-3", "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn malformed_bodies_answer_with_json_errors() {
    let mut app = TestApp::new().await;

    let resp = app
        .post_raw("/api/register", "application/json", r#"{"email":"#)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.error().is_empty());

    let resp = app
        .post_raw("/api/login", "text/plain", "email=ada@example.com")
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.error().is_empty());

    let resp = app
        .post("/api/register", json!({ "email": 5, "password": "hunter22" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.error().is_empty());
}
