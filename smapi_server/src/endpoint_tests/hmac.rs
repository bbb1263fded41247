use std::sync::Arc;

use actix_web::{http::StatusCode, test, test::TestRequest, App};
use chrono::{Duration, Utc};
use log::*;
use smapi_auth::{replay::ReplayGuard, traits::AccountApiError, RequestVerifier, VerifierConfig};

use super::{
    helpers::{
        call_and_unpack,
        configure_app,
        known_account,
        protected_scope,
        result_id,
        signed_request,
        signed_request_for,
    },
    mocks::MockAccounts,
};

fn resolving_accounts() -> MockAccounts {
    let mut accounts = MockAccounts::new();
    accounts.expect_resolve_account().returning(|_| Ok(Some(known_account())));
    accounts
}

async fn send(
    accounts: MockAccounts,
    enabled: bool,
    req: TestRequest,
) -> (StatusCode, actix_web::http::header::HeaderMap, String) {
    let _ = env_logger::try_init().ok();
    let app = test::init_service(App::new().configure(configure_app(accounts, enabled))).await;
    call_and_unpack(&app, req).await
}

#[actix_web::test]
async fn request_without_headers_is_challenged() {
    let req = TestRequest::get().uri("/api/whoami");
    let (status, headers, body) = send(MockAccounts::new(), true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("3"));
    assert_eq!(headers.get("WWW-Authenticate").unwrap(), "SmNetHmac1");
    assert!(body.contains("authorization header"), "was: {body}");
}

#[actix_web::test]
async fn unrecognized_scheme_is_challenged() {
    let req = TestRequest::get().uri("/api/whoami").insert_header(("Authorization", "Bearer abcdef"));
    let (status, headers, _) = send(MockAccounts::new(), true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("3"));
}

#[actix_web::test]
async fn signed_request_reaches_the_handler() {
    let req = signed_request("GET", "/api/whoami", b"", Utc::now());
    let (status, _, body) = send(resolving_accounts(), true, req).await;
    info!("Response body: {body}");
    assert!(status.is_success());
    assert!(body.contains("pub1"), "was: {body}");
}

#[actix_web::test]
async fn signed_body_is_echoed_back() {
    let req = signed_request("POST", "/api/echo", b"{\"hello\":\"world\"}", Utc::now());
    let (status, _, body) = send(resolving_accounts(), true, req).await;
    assert!(status.is_success());
    assert_eq!(body, "{\"hello\":\"world\"}");
}

#[actix_web::test]
async fn unknown_public_key_is_rejected() {
    let mut accounts = MockAccounts::new();
    accounts.expect_resolve_account().returning(|_| Ok(None));
    let req = signed_request("GET", "/api/whoami", b"", Utc::now());
    let (status, headers, _) = send(accounts, true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("9"));
}

#[actix_web::test]
async fn disabled_account_is_rejected() {
    let mut accounts = MockAccounts::new();
    accounts.expect_resolve_account().returning(|_| Ok(Some(known_account().disabled())));
    let req = signed_request("GET", "/api/whoami", b"", Utc::now());
    let (status, headers, _) = send(accounts, true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("10"));
}

#[actix_web::test]
async fn account_store_failure_maps_to_api_unavailable() {
    let mut accounts = MockAccounts::new();
    accounts
        .expect_resolve_account()
        .returning(|_| Err(AccountApiError::StoreError("connection pool exhausted".to_string())));
    let req = signed_request("GET", "/api/whoami", b"", Utc::now());
    let (status, headers, body) = send(accounts, true, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(result_id(&headers), Some("2"));
    // The store's own error message must not leak to the client.
    assert!(!body.contains("connection pool"), "was: {body}");
}

#[actix_web::test]
async fn stale_timestamp_is_out_of_period() {
    let req = signed_request("GET", "/api/whoami", b"", Utc::now() - Duration::minutes(16));
    let (status, headers, _) = send(resolving_accounts(), true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("6"));
}

#[actix_web::test]
async fn replayed_request_is_rejected_the_second_time() {
    let _ = env_logger::try_init().ok();
    let app = test::init_service(App::new().configure(configure_app(resolving_accounts(), true))).await;
    let signed_at = Utc::now();

    let first = signed_request("GET", "/api/whoami", b"", signed_at);
    let (status, _, _) = call_and_unpack(&app, first).await;
    assert!(status.is_success());

    // Identical headers and timestamp the second time around.
    let replayed = signed_request("GET", "/api/whoami", b"", signed_at);
    let (status, headers, _) = call_and_unpack(&app, replayed).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("7"));
}

#[actix_web::test]
async fn tampered_body_fails_the_digest_check() {
    let req = signed_request("POST", "/api/echo", b"{}", Utc::now()).set_payload(&b"{\"x\":1}"[..]);
    let (status, headers, _) = send(resolving_accounts(), true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("8"));
}

#[actix_web::test]
async fn wrong_secret_fails_the_signature_check() {
    let req = signed_request_for("GET", "/api/whoami", b"", Utc::now(), "pub1", "wrong-secret");
    let (status, headers, _) = send(resolving_accounts(), true, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(result_id(&headers), Some("4"));
}

#[actix_web::test]
async fn disabled_checks_allow_unsigned_requests() {
    let verifier = Arc::new(RequestVerifier::new(MockAccounts::new(), ReplayGuard::new(), VerifierConfig::default()));
    let app = test::init_service(App::new().service(protected_scope(verifier, false))).await;
    let req = TestRequest::post().uri("/api/echo").set_payload(&b"unsigned"[..]);
    let (status, _, body) = call_and_unpack(&app, req).await;
    assert!(status.is_success());
    assert_eq!(body, "unsigned");
}
