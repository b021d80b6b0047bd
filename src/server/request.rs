//! Request head parsing
//!
//! Only the request line matters for replay; headers are read and discarded
//! so the body (if any) is never touched.

use crate::error::ReplayError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Upper bound on request line plus headers
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: usize,
}

/// Read the request line and headers up to the blank line
///
/// Returns `Ok(None)` if the peer closed the connection without sending
/// anything.
pub async fn read_head<R>(reader: &mut R) -> Result<Option<RequestHead>, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut total = 0;

    // Tolerate stray CRLFs ahead of the request line
    let request_line = loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        total += n;
        if total > MAX_HEAD_BYTES {
            return Err(ReplayError::MalformedRequest("request head too large".into()));
        }
        if !line.trim().is_empty() {
            break line.trim_end().to_string();
        }
    };

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return Err(ReplayError::MalformedRequest(format!(
            "bad request line {:?}",
            request_line
        )));
    };
    let version = parts.next().unwrap_or("HTTP/0.9").to_string();

    let mut headers = 0;
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        total += n;
        if total > MAX_HEAD_BYTES {
            return Err(ReplayError::MalformedRequest("request head too large".into()));
        }
        if n == 0 || line.trim_end().is_empty() {
            break;
        }
        headers += 1;
    }

    Ok(Some(RequestHead {
        method: method.to_string(),
        path: path.to_string(),
        version,
        headers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> Result<Option<RequestHead>, ReplayError> {
        let mut reader = BufReader::new(raw.as_bytes());
        read_head(&mut reader).await
    }

    #[tokio::test]
    async fn test_post_request() {
        let head = parse("POST /flows HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(head.method, "POST");
        assert_eq!(head.path, "/flows");
        assert_eq!(head.version, "HTTP/1.1");
        assert_eq!(head.headers, 2);
    }

    #[tokio::test]
    async fn test_leading_blank_lines() {
        let head = parse("\r\nGET / HTTP/1.0\r\n\r\n").await.unwrap().unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.headers, 0);
    }

    #[tokio::test]
    async fn test_empty_connection() {
        assert_eq!(parse("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_request_line() {
        let err = parse("POST\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, ReplayError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_oversized_head() {
        let raw = format!("POST / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(MAX_HEAD_BYTES));
        assert!(parse(&raw).await.is_err());
    }
}
