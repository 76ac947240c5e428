//! HTTP adapter mapping for domain errors.
//!
//! Domain failures become small HTML error pages with a status code taken
//! from the [`ErrorCode`]. Internal messages are replaced before they reach
//! the client; the trace identifier is always echoed.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::inbound::http::views;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &Error) -> &str {
    if status_for(error.code()).is_server_error() {
        "Internal server error"
    } else {
        error.message()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = ?self.code(), message = %self.message(), trace_id = ?self.trace_id(), "request failed");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder
            .content_type(views::HTML_CONTENT_TYPE)
            .body(views::error_page(status, client_message(self), self.trace_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TraceId;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_web::test]
    async fn internal_messages_are_redacted() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
            .parse()
            .expect("valid UUID");
        let error = TraceId::scope(trace_id, async {
            Error::internal("credential store failure: disk on fire")
        })
        .await;
        let response = error.error_response();
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("00000000-0000-0000-0000-000000000000")
        );
        let body = to_bytes(response.into_body()).await.expect("body");
        let text = std::str::from_utf8(&body).expect("utf8");
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("disk on fire"));
        assert!(text.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let response = Error::invalid_request("form incomplete").error_response();
        let body = to_bytes(response.into_body()).await.expect("body");
        assert!(
            std::str::from_utf8(&body)
                .expect("utf8")
                .contains("form incomplete")
        );
    }
}
