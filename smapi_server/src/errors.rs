use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use smapi_auth::{
    headers::{AUTH_RESULT_DESC_HEADER, AUTH_RESULT_ID_HEADER, AUTH_SCHEME},
    VerificationError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] VerificationError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationError(e) => match e {
                VerificationError::UserHasNoPermission => StatusCode::FORBIDDEN,
                VerificationError::ApiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                VerificationError::FailedForUnknownReason => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());
        if let Self::AuthenticationError(e) = self {
            // The diagnostic headers carry the result id and reason; never the expected signature
            // or anything derived from the secret key.
            builder
                .insert_header(("WWW-Authenticate", AUTH_SCHEME))
                .insert_header((AUTH_RESULT_ID_HEADER, e.result_id().to_string()))
                .insert_header((AUTH_RESULT_DESC_HEADER, e.to_string()));
        }
        builder.body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
