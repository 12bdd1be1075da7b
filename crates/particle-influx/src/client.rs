// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB 1.x HTTP write client.

use crate::batch::Batch;
use crate::error::PollError;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

/// Connection settings for [`InfluxClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Base address, e.g. `http://localhost:8086`.
    pub addr: String,
    /// Basic-auth username. No auth is sent when empty.
    pub username: String,
    pub password: String,
}

/// Error body returned by InfluxDB on rejected writes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Blocking client for the `/write` endpoint.
pub struct InfluxClient {
    http: Client,
    write_url: Url,
    username: String,
    password: String,
}

impl InfluxClient {
    /// Build a client. Fails if `addr` is not an `http`/`https` URL.
    pub fn new(config: HttpConfig) -> Result<Self, PollError> {
        let base = Url::parse(&config.addr)
            .map_err(|e| PollError::InvalidAddress(format!("{}: {}", config.addr, e)))?;

        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(PollError::InvalidAddress(format!(
                    "unsupported protocol scheme: {}",
                    other
                )))
            }
        }

        let write_url = base
            .join("write")
            .map_err(|e| PollError::InvalidAddress(format!("{}: {}", config.addr, e)))?;

        Ok(Self {
            http: Client::builder().build()?,
            write_url,
            username: config.username,
            password: config.password,
        })
    }

    /// Scheme, host and port the client writes to.
    pub fn addr(&self) -> String {
        self.write_url.origin().ascii_serialization()
    }

    /// Full `/write` URL (without query).
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// Send every point in `batch` in one request.
    pub fn write(&self, batch: &Batch) -> Result<(), PollError> {
        let mut query = vec![
            ("db", batch.database().to_string()),
            ("precision", batch.precision().as_str().to_string()),
        ];
        if let Some(rp) = batch.retention_policy() {
            query.push(("rp", rp.to_string()));
        }

        let mut request = self
            .http
            .post(self.write_url.clone())
            .query(&query)
            .body(batch.to_line_protocol());
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        tracing::debug!(
            url = %self.write_url,
            db = batch.database(),
            points = batch.len(),
            "Writing batch to InfluxDB"
        );

        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read InfluxDB error body");
                String::new()
            }
        };
        Err(PollError::Write {
            status,
            message: error_message(status, &body),
        })
    }
}

/// Extract the `error` field from an InfluxDB error body, falling back to
/// the raw text, then to the status reason when the body is empty.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
