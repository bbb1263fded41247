use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{HttpServiceFactory, Service, ServiceResponse},
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    HttpResponse,
};
use chrono::{DateTime, Utc};
use smapi_auth::{
    replay::ReplayGuard,
    signer::RequestSigner,
    traits::ApiAccount,
    RequestVerifier,
    VerifierConfig,
};
use smapi_common::Secret;

use super::mocks::MockAccounts;
use crate::{
    middleware::HmacAuthMiddlewareFactory,
    routes::{echo, whoami},
};

pub const TEST_PUBLIC_KEY: &str = "pub1";
pub const TEST_SECRET_KEY: &str = "abc123";

pub fn known_account() -> ApiAccount {
    ApiAccount::new(TEST_PUBLIC_KEY, Secret::new(TEST_SECRET_KEY.to_string()))
}

/// Configure a test app with the `/api` scope wrapped in the HMAC middleware, backed by the given
/// mock account store.
pub fn configure_app(accounts: MockAccounts, enabled: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let verifier = Arc::new(RequestVerifier::new(accounts, ReplayGuard::new(), VerifierConfig::default()));
        cfg.service(protected_scope(verifier, enabled));
    }
}

pub fn protected_scope(
    verifier: Arc<RequestVerifier<MockAccounts>>,
    enabled: bool,
) -> impl HttpServiceFactory {
    web::scope("/api").wrap(HmacAuthMiddlewareFactory::new(verifier, enabled)).service(whoami).service(echo)
}

/// A fully signed test request for the credentials in [`known_account`]. Test requests resolve
/// their own absolute URL as `http://localhost:8080<path>`, so that is what gets signed.
pub fn signed_request(method: &str, path: &str, body: &[u8], timestamp: DateTime<Utc>) -> TestRequest {
    signed_request_for(method, path, body, timestamp, TEST_PUBLIC_KEY, TEST_SECRET_KEY)
}

pub fn signed_request_for(
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: DateTime<Utc>,
    public_key: &str,
    secret_key: &str,
) -> TestRequest {
    let signer = RequestSigner::new(public_key, Secret::new(secret_key.to_string()));
    let url = format!("http://localhost:8080{path}");
    let signed = signer.sign_request_at(method, "application/json", &url, body, timestamp).expect("signing failed");
    let mut req = match method {
        "POST" => TestRequest::post(),
        "PUT" => TestRequest::put(),
        "DELETE" => TestRequest::delete(),
        _ => TestRequest::get(),
    };
    req = req.uri(path).insert_header(("Accept", "application/json"));
    for (name, value) in signed.as_header_pairs() {
        req = req.insert_header((name, value));
    }
    if !body.is_empty() {
        req = req.set_payload(body.to_vec());
    }
    req
}

/// Drive a request through the test service and unpack the response. Failures the middleware
/// reports as errors are rendered to their HTTP form, the way the server dispatcher would.
pub async fn call_and_unpack<S, B>(app: &S, req: TestRequest) -> (StatusCode, HeaderMap, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req.to_request()).await {
        Ok(res) => unpack(res.into_parts().1),
        Err(e) => unpack(HttpResponse::from_error(e)),
    }
}

pub fn unpack<B: MessageBody>(res: HttpResponse<B>) -> (StatusCode, HeaderMap, String) {
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.into_body().try_into_bytes().map_err(|_| "unreadable body").unwrap();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

pub fn result_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(smapi_auth::headers::AUTH_RESULT_ID_HEADER).and_then(|v| v.to_str().ok())
}
