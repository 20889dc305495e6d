/// Middleware for the API server
///
/// - `request_log`: per-request access log

pub mod request_log;
