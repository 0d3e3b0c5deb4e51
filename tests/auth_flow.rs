mod common;

use axum::http::StatusCode;
use serde_json::json;
use totp_rs::{Algorithm, Secret, TOTP};

use common::{test_password, TestContext};

fn totp_for(secret_b32: &str) -> TOTP {
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        Secret::Encoded(secret_b32.to_string()).to_bytes().unwrap(),
        Some("GarageKeep".into()),
        "alice@example.com".into(),
    )
    .unwrap()
}

#[tokio::test]
async fn register_login_and_me_roundtrip() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let response = ctx
        .server
        .get("/api/auth/me")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    // First account administers the deployment.
    assert_eq!(body["two_factor_enabled"], false);
}

#[tokio::test]
async fn weak_passwords_are_rejected_with_the_first_unmet_rule() {
    let ctx = TestContext::new().await;

    let cases = [
        ("a1", "8 characters"),
        ("lowercase1", "uppercase"),
        ("UPPERCASE1", "lowercase"),
        ("NoDigitsHere", "number"),
    ];
    for (password, expected) in cases {
        let response = ctx
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": password,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(
            body["error"].as_str().unwrap().contains(expected),
            "password {password:?} should fail on {expected:?}, got {body}"
        );
    }
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("carol", test_password()).await;

    let unknown = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": test_password() }))
        .await;
    let wrong = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "carol", "password": "Wr0ngPass" }))
        .await;

    unknown.assert_status(StatusCode::UNAUTHORIZED);
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    let unknown_body: serde_json::Value = unknown.json();
    let wrong_body: serde_json::Value = wrong.json();
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn duplicate_username_and_email_conflict() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("dave", test_password()).await;

    let same_username = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "username": "dave",
            "email": "other@example.com",
            "password": test_password(),
        }))
        .await;
    same_username.assert_status(StatusCode::CONFLICT);

    let same_email = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "username": "dave2",
            "email": "dave@example.com",
            "password": test_password(),
        }))
        .await;
    same_email.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn two_factor_setup_enable_and_login_challenge() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let setup = ctx
        .server
        .post("/api/auth/setup-2fa")
        .authorization_bearer(&token)
        .await;
    setup.assert_status_ok();
    let setup_body: serde_json::Value = setup.json();
    let secret = setup_body["secret"].as_str().unwrap().to_string();
    assert!(setup_body["otpauth_url"]
        .as_str()
        .unwrap()
        .starts_with("otpauth://totp/"));
    assert!(setup_body["qr_code"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    let backup_codes: Vec<String> = setup_body["backup_codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    assert_eq!(backup_codes.len(), 10);

    // Confirming with a wrong code leaves 2FA off.
    let bad = ctx
        .server
        .post("/api/auth/enable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "code": "000000" }))
        .await;
    bad.assert_status(StatusCode::UNAUTHORIZED);

    let code = totp_for(&secret).generate_current().unwrap();
    let good = ctx
        .server
        .post("/api/auth/enable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "code": code }))
        .await;
    good.assert_status_ok();

    // Login now stops at the challenge instead of returning tokens.
    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": test_password() }))
        .await;
    login.assert_status_ok();
    let challenge: serde_json::Value = login.json();
    assert_eq!(challenge["requires_2fa"], true);
    assert!(challenge.get("access_token").is_none());
    let user_id = challenge["user_id"].as_i64().unwrap();

    // A fresh TOTP code completes the login.
    let code = totp_for(&secret).generate_current().unwrap();
    let verified = ctx
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "user_id": user_id, "code": code }))
        .await;
    verified.assert_status_ok();
    let session: serde_json::Value = verified.json();
    assert!(session["access_token"].as_str().is_some());

    // A backup code also works, exactly once.
    let backup = &backup_codes[0];
    let first = ctx
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "user_id": user_id, "code": backup }))
        .await;
    first.assert_status_ok();

    let second = ctx
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "user_id": user_id, "code": backup }))
        .await;
    second.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn racing_logins_with_one_backup_code_have_exactly_one_winner() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let setup = ctx
        .server
        .post("/api/auth/setup-2fa")
        .authorization_bearer(&token)
        .await;
    let setup_body: serde_json::Value = setup.json();
    let secret = setup_body["secret"].as_str().unwrap().to_string();
    let backup = setup_body["backup_codes"][0].as_str().unwrap().to_string();

    let code = totp_for(&secret).generate_current().unwrap();
    ctx.server
        .post("/api/auth/enable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "code": code }))
        .await
        .assert_status_ok();

    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": test_password() }))
        .await;
    let challenge: serde_json::Value = login.json();
    let user_id = challenge["user_id"].as_i64().unwrap();

    // Two logins race to consume the same backup code; the stored list only
    // swaps under one of them.
    let first = ctx
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "user_id": user_id, "code": backup }));
    let second = ctx
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "user_id": user_id, "code": backup }));
    let (first, second) = tokio::join!(first, second);

    let statuses = [first.status_code(), second.status_code()];
    assert!(statuses.contains(&StatusCode::OK), "got {statuses:?}");
    assert!(
        statuses.contains(&StatusCode::UNAUTHORIZED),
        "got {statuses:?}"
    );
}

#[tokio::test]
async fn disable_two_factor_requires_the_password() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let setup = ctx
        .server
        .post("/api/auth/setup-2fa")
        .authorization_bearer(&token)
        .await;
    let setup_body: serde_json::Value = setup.json();
    let secret = setup_body["secret"].as_str().unwrap().to_string();
    let code = totp_for(&secret).generate_current().unwrap();
    ctx.server
        .post("/api/auth/enable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "code": code }))
        .await
        .assert_status_ok();

    let wrong = ctx
        .server
        .post("/api/auth/disable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "password": "Wr0ngPass" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);

    let right = ctx
        .server
        .post("/api/auth/disable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "password": test_password() }))
        .await;
    right.assert_status_ok();

    // Login no longer challenges.
    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": test_password() }))
        .await;
    login.assert_status_ok();
    let body: serde_json::Value = login.json();
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn setup_while_enabled_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let setup = ctx
        .server
        .post("/api/auth/setup-2fa")
        .authorization_bearer(&token)
        .await;
    let setup_body: serde_json::Value = setup.json();
    let secret = setup_body["secret"].as_str().unwrap().to_string();
    let code = totp_for(&secret).generate_current().unwrap();
    ctx.server
        .post("/api/auth/enable-2fa")
        .authorization_bearer(&token)
        .json(&json!({ "code": code }))
        .await
        .assert_status_ok();

    let again = ctx
        .server
        .post("/api/auth/setup-2fa")
        .authorization_bearer(&token)
        .await;
    again.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn email_verification_gates_login_and_tokens_are_single_use() {
    let ctx = TestContext::with_verification_enabled().await;

    ctx.server
        .post("/api/auth/register")
        .json(&json!({
            "username": "erin",
            "email": "erin@example.com",
            "password": test_password(),
        }))
        .await
        .assert_status(StatusCode::CREATED);

    // Unverified accounts cannot log in.
    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "erin", "password": test_password() }))
        .await;
    login.assert_status(StatusCode::FORBIDDEN);

    // The mailer captured exactly one link; pull the token out of it.
    let link = ctx.mailer.links.lock().unwrap().last().unwrap().clone();
    let token = link.split("token=").nth(1).unwrap().to_string();

    let verify = ctx
        .server
        .post("/api/auth/verify-email")
        .json(&json!({ "token": token }))
        .await;
    verify.assert_status_ok();

    // Second consumption fails; the token was cleared.
    let again = ctx
        .server
        .post("/api/auth/verify-email")
        .json(&json!({ "token": token }))
        .await;
    again.assert_status(StatusCode::BAD_REQUEST);

    // Login now succeeds.
    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "erin", "password": test_password() }))
        .await;
    login.assert_status_ok();
}

#[tokio::test]
async fn signups_can_be_disabled() {
    let ctx = TestContext::with_config(|config| config.signups_disabled = true).await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "username": "frank",
            "email": "frank@example.com",
            "password": test_password(),
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refresh_rotates_tokens_and_rejects_access_tokens() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("gina", test_password()).await;

    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "gina", "password": test_password() }))
        .await;
    let body: serde_json::Value = login.json();
    let access = body["access_token"].as_str().unwrap();
    let refresh = body["refresh_token"].as_str().unwrap();

    let refreshed = ctx
        .server
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh }))
        .await;
    refreshed.assert_status_ok();
    let refreshed_body: serde_json::Value = refreshed.json();
    assert!(refreshed_body["access_token"].as_str().is_some());

    // An access token is not accepted where a refresh token is required.
    let misused = ctx
        .server
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": access }))
        .await;
    misused.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_credentials_replaces_all_three_in_one_call() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("setupuser", test_password()).await;

    let response = ctx
        .server
        .post("/api/auth/update-credentials")
        .authorization_bearer(&token)
        .json(&json!({
            "username": "realname",
            "email": "realname@example.com",
            "password": "Fresh1Pass",
        }))
        .await;
    response.assert_status_ok();

    // The old username no longer logs in; the new triple does.
    let old = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "setupuser", "password": test_password() }))
        .await;
    old.assert_status(StatusCode::UNAUTHORIZED);

    let new = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "realname", "password": "Fresh1Pass" }))
        .await;
    new.assert_status_ok();
    let body: serde_json::Value = new.json();
    assert!(body["access_token"].as_str().is_some());

    let me = ctx
        .server
        .get("/api/auth/me")
        .authorization_bearer(body["access_token"].as_str().unwrap())
        .await;
    let me_body: serde_json::Value = me.json();
    assert_eq!(me_body["email"], "realname@example.com");
}

#[tokio::test]
async fn change_password_requires_current_and_applies_policy() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("hank", test_password()).await;

    let wrong_current = ctx
        .server
        .post("/api/auth/change-password")
        .authorization_bearer(&token)
        .json(&json!({ "current_password": "Wr0ngPass", "new_password": "NewPass12" }))
        .await;
    wrong_current.assert_status(StatusCode::UNAUTHORIZED);

    let weak_new = ctx
        .server
        .post("/api/auth/change-password")
        .authorization_bearer(&token)
        .json(&json!({ "current_password": test_password(), "new_password": "short" }))
        .await;
    weak_new.assert_status(StatusCode::BAD_REQUEST);

    let ok = ctx
        .server
        .post("/api/auth/change-password")
        .authorization_bearer(&token)
        .json(&json!({ "current_password": test_password(), "new_password": "NewPass12" }))
        .await;
    ok.assert_status_ok();

    let login = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "hank", "password": "NewPass12" }))
        .await;
    login.assert_status_ok();
}
