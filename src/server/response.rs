//! HTTP/1.0 response heads
//!
//! Replay bodies have no known length, so responses are HTTP/1.0 without
//! `Content-Length` and the end of the body is signalled by closing the
//! connection.

use crate::util::time::http_date;
use chrono::Utc;

/// Value of the `Server` header
pub const SERVER_NAME: &str = concat!("flowreplay/", env!("CARGO_PKG_VERSION"));

/// `200 OK` head; the streamed body follows directly
pub fn ok_head() -> String {
    format!(
        "HTTP/1.0 200 OK\r\nServer: {}\r\nDate: {}\r\n\r\n",
        SERVER_NAME,
        http_date(Utc::now())
    )
}

/// Complete error response with a short plain-text body
pub fn error_response(code: u16, reason: &str, message: &str) -> String {
    let body = format!("Error {}: {}\n", code, message);
    format!(
        "HTTP/1.0 {} {}\r\nServer: {}\r\nDate: {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        reason,
        SERVER_NAME,
        http_date(Utc::now()),
        body.len(),
        body
    )
}
