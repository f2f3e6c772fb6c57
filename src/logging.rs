use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

/// Longest request or result body that gets logged verbatim
const MAX_LOGGED_BODY: usize = 1024;

/// Bodies larger than this, or of unknown size, are passed through unlogged
const MAX_BUFFERED_BODY: usize = 16 * 1024 * 1024;

/// Logs each routed call with its arguments before it runs and its result after
pub async fn log_calls(request: Request, next: Next) -> Response {
    let call = format!(
        "{} {}",
        request.method(),
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
            .unwrap_or_else(|| request.uri().path())
    );
    let target = match request.uri().query() {
        Some(query) => format!("{}?{}", request.uri().path(), query),
        None => request.uri().path().to_string(),
    };

    let (parts, body) = request.into_parts();
    let request = match buffer(body).await {
        Ok(Buffered::Complete(bytes)) => {
            if bytes.is_empty() {
                info!("Calling {} with arguments: [{}]", call, target);
            } else {
                info!(
                    "Calling {} with arguments: [{}, {}]",
                    call,
                    target,
                    truncate(&String::from_utf8_lossy(&bytes), MAX_LOGGED_BODY)
                );
            }
            Request::from_parts(parts, Body::from(bytes))
        }
        Ok(Buffered::Skipped(body)) => {
            info!(
                "Calling {} with arguments: [{}, <body not logged>]",
                call, target
            );
            Request::from_parts(parts, body)
        }
        Err(e) => {
            error!("{} failed to read request body: {}", call, e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    match buffer(body).await {
        Ok(Buffered::Complete(bytes)) => {
            info!(
                "{} finished with {}: {}",
                call,
                parts.status,
                truncate(&String::from_utf8_lossy(&bytes), MAX_LOGGED_BODY)
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Ok(Buffered::Skipped(body)) => {
            info!("{} finished with {} (body not logged)", call, parts.status);
            Response::from_parts(parts, body)
        }
        Err(e) => {
            error!("{} failed to read response body: {}", call, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

enum Buffered {
    Complete(Bytes),
    Skipped(Body),
}

/// Collect `body` only when its size is known up front and within bounds
async fn buffer(body: Body) -> Result<Buffered, axum::Error> {
    match body.size_hint().upper() {
        Some(upper) if upper <= MAX_BUFFERED_BODY as u64 => {
            Ok(Buffered::Complete(to_bytes(body, MAX_BUFFERED_BODY).await?))
        }
        _ => Ok(Buffered::Skipped(body)),
    }
}

/// Cut `text` to at most `max` bytes on a char boundary, noting the full length
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes)", &text[..end], text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::Request,
        middleware,
        routing::{get, post},
        Router,
    };
    use std::io;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    // ==================== Helpers ====================

    /// Collects formatted log lines in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    fn logged_app() -> Router {
        Router::new()
            .route("/echo/:word", get(|| async { (StatusCode::CREATED, "body") }))
            .route("/echo", post(|body: String| async move { body.to_uppercase() }))
            .route(
                "/large",
                get(|| async { "x".repeat(MAX_BUFFERED_BODY + 1024 * 1024) }),
            )
            .layer(middleware::from_fn(log_calls))
    }

    // ==================== Truncation Tests ====================

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long() {
        let text = "a".repeat(20);
        assert_eq!(truncate(&text, 5), "aaaaa… (20 bytes)");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // each 'é' is two bytes
        let text = "éééé";
        assert_eq!(truncate(text, 3), "é… (8 bytes)");
    }

    // ==================== Middleware Tests ====================

    #[tokio::test]
    async fn test_response_passes_through_unchanged() {
        let response = logged_app()
            .oneshot(
                Request::builder()
                    .uri("/echo/hi?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"body");
    }

    #[tokio::test]
    async fn test_logs_arguments_and_result() {
        let (logs, _guard) = capture_logs();

        let response = logged_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo?lang=fr")
                    .body(Body::from(r#"{"text":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // handler still sees the rebuilt request body
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"TEXT":"HELLO"}"#);

        let output = logs.contents();
        assert!(output.contains(r#"Calling POST /echo with arguments: [/echo?lang=fr, {"text":"hello"}]"#));
        assert!(output.contains(r#"POST /echo finished with 200 OK: {"TEXT":"HELLO"}"#));
    }

    #[tokio::test]
    async fn test_logs_matched_route_for_path_params() {
        let (logs, _guard) = capture_logs();

        logged_app()
            .oneshot(Request::builder().uri("/echo/hi").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let output = logs.contents();
        assert!(output.contains("Calling GET /echo/:word with arguments: [/echo/hi]"));
        assert!(output.contains("GET /echo/:word finished with 201 Created: body"));
    }

    #[tokio::test]
    async fn test_oversized_response_passes_through() {
        let (logs, _guard) = capture_logs();

        let response = logged_app()
            .oneshot(Request::builder().uri("/large").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), MAX_BUFFERED_BODY + 1024 * 1024);

        assert!(logs
            .contents()
            .contains("GET /large finished with 200 OK (body not logged)"));
    }
}
