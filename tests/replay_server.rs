//! End-to-end tests over real TCP connections

use flowreplay::config::{Config, ReplayMode};
use flowreplay::server::ReplayServer;
use flowreplay::LineBuffer;
use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Start a server on an ephemeral port with fast pacing
async fn start_server(mode: ReplayMode, buffer: LineBuffer) -> SocketAddr {
    let mut config = Config::default();
    config.server.port = 0;
    config.mode = mode;
    config.pacing.jitter.mean = 0.01;
    config.pacing.jitter.stdev = 0.005;
    config.pacing.batch_size.mean = 50.0;
    config.pacing.batch_size.stdev = 10.0;
    config.seed = Some(1);

    let server = ReplayServer::bind(
        config.bind_addr(),
        config.session_config().unwrap(),
        Arc::new(buffer),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(server.serve());
    addr
}

async fn request(addr: SocketAddr, method: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "{} /replay HTTP/1.1\r\nHost: {}\r\nContent-Length: 0\r\n\r\n",
        method, addr
    );
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = String::new();
    tokio::time::timeout(Duration::from_secs(30), stream.read_to_string(&mut raw))
        .await
        .expect("replay did not finish in time")
        .unwrap();
    raw
}

fn split_body(raw: &str) -> (&str, &str) {
    raw.split_once("\r\n\r\n").expect("response has no header terminator")
}

fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("10.0.0.{},{}", i % 255, i)).collect()
}

#[tokio::test]
async fn test_dump_over_http() {
    let lines = numbered(1000);
    let addr = start_server(ReplayMode::Dump, LineBuffer::from_lines(&lines)).await;

    let raw = request(addr, "POST").await;
    let (head, body) = split_body(&raw);

    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert!(!head.contains("Content-Length"));
    assert_eq!(body, lines.join("\n") + "\n");
}

#[tokio::test]
async fn test_concurrent_regular_clients() {
    let lines = numbered(400);
    let addr = start_server(ReplayMode::Regular, LineBuffer::from_lines(&lines)).await;
    let expected = lines.join("\n") + "\n";

    let clients: Vec<_> = (0..4)
        .map(|_| tokio::spawn(async move { request(addr, "POST").await }))
        .collect();

    for client in clients {
        let raw = client.await.unwrap();
        let (_, body) = split_body(&raw);
        assert_eq!(body, expected);
    }
}

#[tokio::test]
async fn test_real_rate_over_http() {
    let lines = vec![
        "time,src,dst".to_string(),
        "1609459200,10.0.0.1,10.0.0.2".to_string(),
        "1609459200.2,10.0.0.3,10.0.0.4".to_string(),
    ];
    let addr = start_server(ReplayMode::RealRate, LineBuffer::with_timestamps(&lines)).await;

    let raw = request(addr, "POST").await;
    let (_, body) = split_body(&raw);
    assert_eq!(body, lines.join("\n") + "\n");
}

#[tokio::test]
async fn test_get_is_not_implemented() {
    let addr = start_server(ReplayMode::Dump, LineBuffer::from_lines(["a"])).await;

    let raw = request(addr, "GET").await;
    assert!(raw.starts_with("HTTP/1.0 501 Not Implemented"));
    assert!(raw.contains("Unsupported method ('GET')"));
}

#[test]
fn test_dump_and_real_together_exit_1() {
    let output = Command::new(env!("CARGO_BIN_EXE_flowreplay"))
        .args(["does-not-matter.csv", "--dump", "--real"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot use --dump & --real together"));
}

#[test]
fn test_empty_archive_does_not_serve() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.tar");
    tar::Builder::new(std::fs::File::create(&path).unwrap())
        .into_inner()
        .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_flowreplay"))
        .arg(&path)
        .arg("0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No files found in"));
}
