//! Per-request access log

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

/// Requests slower than this are logged as warnings
const SLOW_REQUEST: Duration = Duration::from_secs(10);

/// Log one line per finished request, warning when a command ran long
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    if elapsed > SLOW_REQUEST {
        warn!(
            method = %method,
            path = %path,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Slow request"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request served"
        );
    }

    response
}
