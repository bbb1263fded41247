//! HMAC authentication middleware for Actix Web.
//!
//! This module provides a middleware that runs the full signature verification state machine
//! against every incoming request before it reaches a handler.
//!
//! Clients sign their requests with their secret key and attach the signature in the
//! `Authorization` header, alongside the `SmNet-Api-Date`, `SmNet-Api-PublicKey` and (for bodied
//! requests) `Content-Md5` headers.
//!
//! Wrap any scope that must only be reachable by authenticated API callers with this middleware.
//! On success the verified identity is inserted into the request extensions as an
//! [`AuthenticatedRequest`]; on failure the request is answered with a 401 challenge carrying the
//! diagnostic result headers.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use smapi_auth::{
    headers::{CONTENT_MD5_HEADER, DATE_HEADER, PUBLIC_KEY_HEADER},
    traits::AccountResolver,
    verifier::{ReceivedRequest, RequestVerifier},
    VerificationError,
};

use crate::errors::ServerError;

pub struct HmacAuthMiddlewareFactory<B> {
    verifier: Arc<RequestVerifier<B>>,
    // If false, then the middleware will not check request signatures and always allow the call
    enabled: bool,
}

impl<B> HmacAuthMiddlewareFactory<B> {
    pub fn new(verifier: Arc<RequestVerifier<B>>, enabled: bool) -> Self {
        HmacAuthMiddlewareFactory { verifier, enabled }
    }
}

impl<S, B, Body> Transform<S, ServiceRequest> for HmacAuthMiddlewareFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AccountResolver + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<Body>;
    type Transform = HmacAuthMiddlewareService<S, B>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacAuthMiddlewareService {
            verifier: Arc::clone(&self.verifier),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacAuthMiddlewareService<S, B> {
    verifier: Arc<RequestVerifier<B>>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B, Body> Service<ServiceRequest> for HmacAuthMiddlewareService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AccountResolver + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<Body>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking request signature");
            if !enabled {
                trace!("🔐️ HMAC checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let body = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract the request body: {e:?}");
                ServerError::from(VerificationError::FailedForUnknownReason)
            })?;
            let received = received_request(&req, &body);
            match verifier.verify(&received).await {
                Ok(auth) => {
                    trace!("🔐️ Signature check for {} ✅️", auth.public_key);
                    req.extensions_mut().insert(auth);
                    req.set_payload(bytes_to_payload(body));
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Denying request. {e}");
                    Err(ServerError::from(e).into())
                },
            }
        })
    }
}

/// Reduce a service request to the facts the verifier signs over. The URL is rebuilt from the
/// server's own connection info rather than taken from any client-controlled header it would be
/// unwise to trust.
fn received_request(req: &ServiceRequest, body: &web::Bytes) -> ReceivedRequest {
    let url = {
        let conn = req.connection_info();
        format!("{}://{}{}", conn.scheme(), conn.host(), req.uri())
    };
    ReceivedRequest {
        method: req.method().as_str().to_string(),
        url,
        accept: header_value(req, "Accept").unwrap_or_default(),
        authorization: header_value(req, "Authorization"),
        public_key: header_value(req, PUBLIC_KEY_HEADER),
        date: header_value(req, DATE_HEADER),
        content_md5: header_value(req, CONTENT_MD5_HEADER),
        body: body.to_vec(),
    }
}

fn header_value(req: &ServiceRequest, name: &str) -> Option<String> {
    req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
