//! # SmNet Web API server
//!
//! An HTTP front end for the SmNet Web API HMAC authentication protocol. It is responsible for:
//! * Mounting the [`smapi_auth`] verifier as middleware over the protected `/api` scope.
//! * Turning verification failures into `401` challenge responses with the diagnostic headers.
//! * Loading the acceptance window, query-encoding mode and API accounts from the environment.
//!
//! ## Configuration
//! The server is configured via `SMAPI_*` environment variables. See [config](config/index.html)
//! for the full list.
//!
//! ## Routes
//! * `/health`: a health check route that returns a 200 OK response.
//! * `/api/whoami`: returns the authenticated caller's public key and request timestamp.
//! * `/api/echo`: echoes the (digest-checked) request body back.

pub mod cli;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
