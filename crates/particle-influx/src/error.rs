// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Poll pipeline errors.

use crate::batch::BatchError;
use crate::influx::PointError;
use reqwest::StatusCode;
use thiserror::Error;

/// Every way a poll can fail. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("non-200 response from Particle API: {}", reason(.status))]
    Status { status: StatusCode },

    #[error("failed to decode Particle response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid InfluxDB address: {0}")]
    InvalidAddress(String),

    #[error("InfluxDB write failed ({status}): {message}")]
    Write { status: StatusCode, message: String },

    #[error(transparent)]
    Point(#[from] PointError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

fn reason(status: &StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
