//! Actix mapping for the optimisation error envelope.
//!
//! Handlers return [`ApiResult`]; this module decides the status line, echoes
//! the trace id header and keeps internal failure text off the wire. Provider
//! failures are the one 5xx family whose message and `providerStatus` detail
//! are meant for callers, so they pass through untouched.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

pub use crate::domain::ApiResult;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ProviderNotConfigured
        | ErrorCode::ProviderError
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body actually serialised for `error`.
fn wire_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

fn log_server_failure(error: &Error, status: StatusCode) {
    let trace_id = error.trace_id().unwrap_or_default();
    match error.code() {
        ErrorCode::InternalError => error!(
            status = status.as_u16(),
            trace_id,
            reason = error.message(),
            "request failed with an internal error"
        ),
        code => warn!(
            status = status.as_u16(),
            trace_id,
            ?code,
            reason = error.message(),
            "request failed upstream of the optimiser"
        ),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log_server_failure(self, status);
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(wire_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(REDACTED_MESSAGE)
    }
}
