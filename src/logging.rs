//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a request or response body that is logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match buffer_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_body("Received request", &format!("{} {}", parts.method, parts.uri), &bytes);

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = match buffer_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_body("Sending response", parts.status.as_str(), &bytes);

    Response::from_parts(parts, Body::from(bytes))
}

async fn buffer_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

fn log_body(message: &str, summary: &str, bytes: &[u8]) {
    let body = String::from_utf8_lossy(bytes);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}: {summary}\nbody: {}...",
            truncate(&body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {summary}\nbody: {body:?}");
    }
}

/// Shorten `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, truncate};

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("lunch", 10), "lunch");
    }

    #[test]
    fn truncate_does_not_split_characters() {
        // '€' is three bytes long.
        assert_eq!(truncate("a€b", 2), "a");
    }

    #[tokio::test]
    async fn bodies_pass_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let text = "x".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        let response = server.post("/echo").text(&text).await;

        response.assert_status_ok();
        response.assert_text(text);
    }
}
