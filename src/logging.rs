//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many characters are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form and query fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["secret", "access_token"];
const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_request(&parts, &redact_secrets(&body_text));

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Replace the values of [REDACTED_FIELDS] in a query string or form body.
fn redact_secrets(text: &str) -> String {
    REDACTED_FIELDS
        .iter()
        .fold(text.to_owned(), |text, field_name| redact_field(&text, field_name))
}

fn redact_field(text: &str, field_name: &str) -> String {
    let needle = format!("{field_name}=");
    let mut redacted = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(position) = rest.find(&needle) {
        let is_field_start = position == 0 || matches!(rest.as_bytes()[position - 1], b'&' | b'?');
        let value_start = position + needle.len();
        let value_end = rest[value_start..]
            .find('&')
            .map_or(rest.len(), |end| value_start + end);

        redacted.push_str(&rest[..value_start]);
        if is_field_start {
            redacted.push_str(REDACTED_VALUE);
        } else {
            redacted.push_str(&rest[value_start..value_end]);
        }

        rest = &rest[value_end..];
    }

    redacted.push_str(rest);
    redacted
}

/// The first `limit` characters of `text`, and whether anything was cut.
fn truncate(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}

fn log_request(parts: &request::Parts, body: &str) {
    let uri = redact_secrets(&parts.uri.to_string());
    let method = &parts.method;
    let headers = &parts.headers;

    match truncate(body, LOG_BODY_LENGTH_LIMIT) {
        (shown, true) => {
            tracing::info!("Received request: {method} {uri}\n{headers:#?}\nbody: {shown}...");
            tracing::debug!("Full request body: {body:?}");
        }
        (_, false) => {
            tracing::info!("Received request: {method} {uri}\n{headers:#?}\nbody: {body:?}");
        }
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    let status = parts.status;
    let headers = &parts.headers;

    match truncate(body, LOG_BODY_LENGTH_LIMIT) {
        (shown, true) => {
            tracing::info!("Sending response: {status}\n{headers:#?}\nbody: {shown}...");
            tracing::debug!("Full response body: {body:?}");
        }
        (_, false) => {
            tracing::info!("Sending response: {status}\n{headers:#?}\nbody: {body:?}");
        }
    }
}

#[cfg(test)]
mod redact_tests {
    use super::redact_secrets;

    #[test]
    fn redacts_secret_fields() {
        let got = redact_secrets("/link?access_token=access-sandbox-1&page=2&secret=abc");

        assert_eq!(got, "/link?access_token=********&page=2&secret=********");
    }

    #[test]
    fn keeps_fields_that_only_end_with_a_secret_name() {
        let got = redact_secrets("client_secret=visible&id=1");

        assert_eq!(got, "client_secret=visible&id=1");
    }

    #[test]
    fn text_without_secrets_is_unchanged() {
        assert_eq!(redact_secrets("id=item_1&page=3"), "id=item_1&page=3");
        assert_eq!(redact_secrets(""), "");
    }
}

#[cfg(test)]
mod truncate_tests {
    use super::truncate;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(truncate("hello", 64), ("hello", false));
    }

    #[test]
    fn truncates_on_character_boundaries() {
        assert_eq!(truncate("$1,234 €€€", 8), ("$1,234 €", true));
    }
}

#[cfg(test)]
mod middleware_tests {
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;

    use super::logging_middleware;

    async fn long_body() -> String {
        "x".repeat(200)
    }

    #[tokio::test]
    async fn passes_long_bodies_through_unchanged() {
        let app = Router::new()
            .route("/long", get(long_body))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/long").await;

        response.assert_status(StatusCode::OK);
        response.assert_text("x".repeat(200));
    }
}
