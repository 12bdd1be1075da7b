// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Particle to InfluxDB temperature poller
//!
//! Reads the `temp` variable of one Particle device from the Particle cloud
//! API and writes it to InfluxDB 1.x as a single point:
//!
//! ```text
//! temperature,location=control-room-shelf celsius=21.5 1700000000
//! ```
//!
//! This crate provides:
//! - Command-line configuration accepting Go-style `-flag` arguments
//! - A blocking Particle variable reader
//! - InfluxDB Line Protocol generation and write batches
//! - A blocking InfluxDB `/write` client
//!
//! # Overview
//!
//! ```text
//! Cli --> PollerConfig --> ParticleClient --> Point --> Batch --> InfluxClient
//! ```
//!
//! Each run performs exactly one read and at most one write. There is no
//! retry; the binary is meant to be driven by cron or a systemd timer.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod influx;
pub mod particle;
pub mod poller;

pub use batch::{Batch, BatchConfig, BatchError};
pub use client::{HttpConfig, InfluxClient};
pub use config::{Cli, ConfigError, InfluxConfig, ParticleConfig, PollerConfig, Scheme};
pub use error::PollError;
pub use influx::{FieldValue, Point, PointError, Precision};
pub use particle::ParticleClient;
pub use poller::Poller;
