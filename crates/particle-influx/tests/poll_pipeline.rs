// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability
#![allow(clippy::float_cmp)] // Test assertions with constants

//! End-to-end poll tests
//!
//! Drives the full fetch/decode/write sequence against in-process HTTP
//! servers standing in for the Particle cloud and InfluxDB.

use particle_influx::{
    Cli, ConfigError, FieldValue, InfluxConfig, ParticleConfig, PollError, Poller, PollerConfig,
    Scheme,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

/// A request as seen by [`MockServer`].
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP/1.1 server answering every request with one canned response.
struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                if let Some(request) = read_request(&mut stream) {
                    recorded.lock().expect("lock").push(request);
                }
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { addr, requests }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_ascii_lowercase(), v.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;

    Some(Recorded {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn config(particle: &MockServer, influx: &MockServer) -> PollerConfig {
    PollerConfig {
        particle: ParticleConfig {
            api_base: particle.url(),
            device: "dev1".to_string(),
            token: "tok-secret".to_string(),
        },
        influx: InfluxConfig {
            scheme: Scheme::Http,
            host: "127.0.0.1".to_string(),
            port: influx.addr.port().to_string(),
            database: "home".to_string(),
            username: "writer".to_string(),
            password: "secret".to_string(),
            retention_policy: None,
        },
    }
}

#[test]
fn test_successful_poll_writes_one_point() {
    let particle = MockServer::start(200, r#"{"Result": 21.5}"#);
    let influx = MockServer::start(204, "");

    let poller = Poller::new(config(&particle, &influx)).expect("poller");
    let point = poller.poll_once().expect("poll");

    assert_eq!(point.measurement(), "temperature");
    assert_eq!(point.tag("location"), Some("control-room-shelf"));
    assert_eq!(point.field("celsius"), Some(&FieldValue::Float(21.5)));

    let reads = particle.requests();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].method, "GET");
    assert_eq!(reads[0].target, "/v1/devices/dev1/temp?access_token=tok-secret");

    let writes = influx.requests();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].method, "POST");
    assert_eq!(writes[0].target, "/write?db=home&precision=s");
    assert_eq!(
        writes[0].header("authorization"),
        Some("Basic d3JpdGVyOnNlY3JldA==")
    );
    assert_eq!(
        writes[0].body,
        format!(
            "temperature,location=control-room-shelf celsius=21.5 {}",
            point.time().timestamp()
        )
    );
}

#[test]
fn test_lowercase_result_and_retention_policy() {
    let particle = MockServer::start(
        200,
        r#"{"cmd":"VarReturn","name":"temp","result":18.75,"coreInfo":{"connected":true}}"#,
    );
    let influx = MockServer::start(204, "");

    let mut cfg = config(&particle, &influx);
    cfg.influx.retention_policy = Some("one_week".to_string());
    cfg.influx.username = String::new();

    let point = Poller::new(cfg).expect("poller").poll_once().expect("poll");
    assert_eq!(point.field("celsius"), Some(&FieldValue::Float(18.75)));

    let writes = influx.requests();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].target, "/write?db=home&precision=s&rp=one_week");
    assert!(writes[0].header("authorization").is_none());
}

#[test]
fn test_particle_error_status_skips_write() {
    let particle = MockServer::start(500, r#"{"error":"internal"}"#);
    let influx = MockServer::start(204, "");

    let result = Poller::new(config(&particle, &influx))
        .expect("poller")
        .poll_once();

    match result {
        Err(PollError::Status { status }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected Status error, got: {:?}", other),
    }
    assert_eq!(particle.requests().len(), 1);
    assert!(influx.requests().is_empty());
}

#[test]
fn test_malformed_reading_skips_write() {
    let particle = MockServer::start(200, r#"{"Result": 21.5"#);
    let influx = MockServer::start(204, "");

    let result = Poller::new(config(&particle, &influx))
        .expect("poller")
        .poll_once();

    assert!(
        matches!(result, Err(PollError::Decode(_))),
        "expected Decode error, got: {:?}",
        result
    );
    assert!(influx.requests().is_empty());
}

#[test]
fn test_database_write_failure_is_reported() {
    let particle = MockServer::start(200, r#"{"Result": 21.5}"#);
    let influx = MockServer::start(500, r#"{"error":"engine: cache maximum memory size exceeded"}"#);

    let result = Poller::new(config(&particle, &influx))
        .expect("poller")
        .poll_once();

    match result {
        Err(PollError::Write { status, message }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "engine: cache maximum memory size exceeded");
        }
        other => panic!("expected Write error, got: {:?}", other),
    }
    assert_eq!(influx.requests().len(), 1);
}

#[test]
fn test_database_write_failure_without_body_uses_status_reason() {
    let particle = MockServer::start(200, r#"{"result": 20.0}"#);
    let influx = MockServer::start(503, "");

    let result = Poller::new(config(&particle, &influx))
        .expect("poller")
        .poll_once();

    match result {
        Err(PollError::Write { status, message }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Write error, got: {:?}", other),
    }
}

#[test]
fn test_hyphen_leading_password_reaches_database() {
    let particle = MockServer::start(200, r#"{"Result": 21.5}"#);
    let influx = MockServer::start(204, "");

    let cli = Cli::try_parse_args([
        "particle-influx",
        "-user",
        "writer",
        "-pass",
        "-s3cret",
        "-db",
        "home",
    ])
    .expect("parse args");
    let mut cfg = cli.into_config().expect("config");
    cfg.particle = config(&particle, &influx).particle;
    cfg.influx.host = "127.0.0.1".to_string();
    cfg.influx.port = influx.addr.port().to_string();

    Poller::new(cfg).expect("poller").poll_once().expect("poll");

    // base64("writer:-s3cret")
    let writes = influx.requests();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].header("authorization"),
        Some("Basic d3JpdGVyOi1zM2NyZXQ=")
    );
}

#[test]
fn test_unreachable_particle_api_hides_token() {
    let closed = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = closed.local_addr().expect("local addr").port();
    drop(closed);

    let influx = MockServer::start(204, "");
    let mut cfg = config(&influx, &influx);
    cfg.particle.api_base = format!("http://127.0.0.1:{}", port);

    let err = Poller::new(cfg)
        .expect("poller")
        .poll_once()
        .expect_err("connection refused");

    assert!(matches!(err, PollError::Request(_)));
    assert!(!err.to_string().contains("tok-secret"));
    assert!(influx.requests().is_empty());
}

#[test]
fn test_secure_flag_selects_https() {
    let cli = Cli::try_parse_args(["particle-influx", "-db", "home", "-secure=true"])
        .expect("parse args");
    let poller = Poller::new(cli.into_config().expect("config")).expect("poller");
    assert_eq!(poller.influx().addr(), "https://localhost:8086");

    let cli = Cli::try_parse_args(["particle-influx", "-db", "home"]).expect("parse args");
    let poller = Poller::new(cli.into_config().expect("config")).expect("poller");
    assert_eq!(poller.influx().addr(), "http://localhost:8086");
}

#[test]
fn test_missing_database_is_config_error() {
    let cli = Cli::try_parse_args(["particle-influx", "-device", "dev1", "-token", "t"])
        .expect("parse args");
    assert_eq!(cli.into_config().unwrap_err(), ConfigError::MissingDatabase);
}

#[test]
fn test_binary_without_database_prints_usage_and_exits_1() {
    let output = Command::new(env!("CARGO_BIN_EXE_particle-influx"))
        .args(["-device", "dev1", "-token", "t"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {}", stderr);
    assert!(stderr.contains("--db"), "stderr: {}", stderr);
}

#[test]
fn test_binary_pipeline_failure_logs_error_and_exits_1() {
    let output = Command::new(env!("CARGO_BIN_EXE_particle-influx"))
        .args(["-db", "d", "-port", "abc", "-device", "dev1", "-token", "t"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "stderr: {}", stderr);
    assert!(stderr.contains("invalid InfluxDB address"), "stderr: {}", stderr);
    assert!(!stderr.contains("Usage"), "stderr: {}", stderr);
}
