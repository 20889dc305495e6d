/// Access log middleware
///
/// Emits one `info` event per request once the response is ready:
///
/// ```text
/// INFO HTTP request method=GET path=/api/v1/subscriptions status=200 duration_ms=3 ip=10.0.0.7 user_agent=curl/8.5.0 content_type=application/json
/// ```
///
/// Request and response bodies are not logged.
///
/// The client address comes from `X-Forwarded-For` when a proxy set it,
/// otherwise from the socket (requires serving with
/// `into_make_service_with_connect_info::<SocketAddr>()`).
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, Router};
/// use subtrack_api::middleware::request_log::log_request;
///
/// let app: Router = Router::new().layer(middleware::from_fn(log_request));
/// ```

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;

/// Logs the request line, outcome, latency and client details
pub async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let ip = client_ip(
        req.headers(),
        req.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0),
    );
    let user_agent = header_str(req.headers(), header::USER_AGENT).to_string();

    let response = next.run(req).await;
    let content_type = header_str(response.headers(), header::CONTENT_TYPE);

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        ip = %ip,
        user_agent = %user_agent,
        content_type = %content_type,
        "HTTP request"
    );

    response
}

/// Header value as text, "" when absent or not visible ASCII
fn header_str(headers: &HeaderMap, name: header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// First `X-Forwarded-For` hop, else the peer address, else "unknown"
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
