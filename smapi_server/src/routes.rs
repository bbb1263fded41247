//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! The handlers under `/api` assume the HMAC middleware has already run: the verified caller
//! identity is read from the request extensions, never re-derived from headers.

use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse, Responder};
use log::warn;
use smapi_auth::AuthenticatedRequest;

use crate::errors::ServerError;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("👍️\n")
}

/// Returns the authenticated caller's public key and the timestamp their request was signed at.
#[get("/whoami")]
pub async fn whoami(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    let auth = req.extensions().get::<AuthenticatedRequest>().cloned().ok_or_else(|| {
        warn!("No authenticated identity found in request extensions");
        ServerError::Unspecified("No authenticated identity found in request extensions".to_string())
    })?;
    Ok(HttpResponse::Ok().json(auth))
}

/// Echoes the request body back. The middleware has already checked the body against its
/// `Content-Md5` header by the time this runs.
#[post("/echo")]
pub async fn echo(body: web::Bytes) -> impl Responder {
    HttpResponse::Ok().content_type("application/octet-stream").body(body)
}
