// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write batches.
//!
//! A batch collects points bound for one database and renders them as a
//! single Line Protocol request body.

use crate::influx::{Point, Precision};
use thiserror::Error;

/// Errors raised while building a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch has no target database")]
    MissingDatabase,
}

/// Settings shared by every point in a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Target database.
    pub database: String,
    /// Timestamp precision used on the wire.
    pub precision: Precision,
    /// Retention policy; the database default when `None`.
    pub retention_policy: Option<String>,
}

/// Points queued for one `/write` request.
#[derive(Debug, Clone)]
pub struct Batch {
    config: BatchConfig,
    points: Vec<Point>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        if config.database.is_empty() {
            return Err(BatchError::MissingDatabase);
        }
        Ok(Self {
            config,
            points: Vec::new(),
        })
    }

    /// Append a point.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    pub fn retention_policy(&self) -> Option<&str> {
        self.config.retention_policy.as_deref()
    }

    /// Get the current number of queued points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render all points as a newline-separated Line Protocol body.
    pub fn to_line_protocol(&self) -> String {
        self.points
            .iter()
            .map(|p| p.to_line_protocol(self.config.precision))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
