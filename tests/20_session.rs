mod common;

use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{send, send_request, FakeIdentity, TestApp, POST_LOGIN_REDIRECT};
use grosir_api::cache::{session_key, SessionCache};

#[tokio::test]
async fn login_returns_bearer_token_and_session_cookie() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_user("budi@example.com", "rahasia"));

    let body = json!({ "email": "budi@example.com", "password": "rahasia" });
    let res = send(app.router(), Method::POST, "/v1/auth/login", None, Some(body)).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["token_type"], "Bearer");
    assert_eq!(res.body["data"]["expires_in"], 3600);
    let token = res.body["data"]["access_token"].as_str().unwrap().to_string();

    let cookies = res.set_cookies();
    assert_eq!(cookies.len(), 1);
    let cookie = &cookies[0];
    assert!(cookie.starts_with(&format!("access_token={}", token)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=3600"));
    assert!(!cookie.contains("Domain"));

    let stored = app.sessions.get(&session_key("budi@example.com")).await?;
    assert_eq!(stored.as_deref(), Some(token.as_str()));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_localized_unauthorized() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_user("budi", "rahasia"));

    let body = json!({ "email": "budi", "password": "salah" });
    let res = send(app.router(), Method::POST, "/v1/auth/login", None, Some(body)).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "nama pengguna atau password kurang tepat");
    assert!(res.set_cookies().is_empty());
    assert!(app.sessions.get(&session_key("budi")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn blank_credentials_fail_validation() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let body = json!({ "email": "  ", "password": "x" });
    let res = send(app.router(), Method::POST, "/v1/auth/login", None, Some(body)).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(res.body["field_errors"]["email"], "is required");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_invalid_json() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))?;
    let res = send_request(app.router(), request).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn logout_revokes_token_and_expires_cookie() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_user("budi", "rahasia"));
    let token = app.login("budi", "rahasia").await?;

    let res = send(app.router(), Method::GET, "/v1/auth/logout", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);

    let cookies = res.set_cookies();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("access_token=;"));
    assert!(cookies[0].contains("Max-Age=0"));

    let res = send(app.router(), Method::GET, "/v1/auth/me", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(app.router(), Method::GET, "/v1/auth/logout", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn session_expires_after_an_hour_without_sliding() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_user("budi", "rahasia"));
    let token = app.login("budi", "rahasia").await?;

    tokio::time::advance(Duration::from_secs(3000)).await;
    let res = send(app.router(), Method::GET, "/v1/auth/me", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);

    // The read above must not have pushed the deadline out
    tokio::time::advance(Duration::from_secs(601)).await;
    let res = send(app.router(), Method::GET, "/v1/auth/me", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn google_entry_redirects_to_hosted_ui() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let res = send(app.router(), Method::GET, "/v1/auth/google", None, None).await?;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let location = res.headers.get(header::LOCATION).unwrap().to_str()?;
    assert!(location.starts_with("https://auth.test/oauth2/authorize?"));
    assert!(location.contains("identity_provider=Google"));
    assert!(location.contains("response_type=CODE"));
    Ok(())
}

#[tokio::test]
async fn callback_without_code_is_bad_request() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let res = send(app.router(), Method::GET, "/v1/auth/callback", None, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(app.router(), Method::GET, "/v1/auth/callback?code=", None, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn callback_with_unknown_code_is_rejected() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let res = send(app.router(), Method::GET, "/v1/auth/callback?code=stale", None, None).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.set_cookies().is_empty());
    Ok(())
}

#[tokio::test]
async fn callback_establishes_session_and_redirects() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_code("abc123", "google_117"));

    let res = send(app.router(), Method::GET, "/v1/auth/callback?code=abc123", None, None).await?;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.headers.get(header::LOCATION).unwrap().to_str()?, POST_LOGIN_REDIRECT);

    let cookie = res.set_cookies().pop().expect("session cookie");
    let token = cookie
        .strip_prefix("access_token=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string();

    let res = send(app.router(), Method::GET, "/v1/auth/me", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["username"], "google_117");
    Ok(())
}

#[tokio::test]
async fn register_reports_code_delivery() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new().with_user("ada@example.com", "x"));

    let body = json!({ "email": "baru@example.com", "password": "Rahasia123!" });
    let res = send(app.router(), Method::POST, "/v1/auth/register", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["destination"], "u***@example.com");

    let body = json!({ "email": "ada@example.com", "password": "Rahasia123!" });
    let res = send(app.router(), Method::POST, "/v1/auth/register", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn confirm_with_wrong_code_is_bad_request() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let body = json!({ "email": "baru@example.com", "code": "000000" });
    let res = send(app.router(), Method::POST, "/v1/auth/confirm", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let body = json!({ "email": "baru@example.com", "code": "123456" });
    let res = send(app.router(), Method::POST, "/v1/auth/confirm", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_reports_degraded_store() -> Result<()> {
    let app = TestApp::new(FakeIdentity::new());

    let res = send(app.router(), Method::GET, "/v1/health", None, None).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["data"]["status"], "degraded");
    assert_eq!(res.body["data"]["version"], "test");
    Ok(())
}
