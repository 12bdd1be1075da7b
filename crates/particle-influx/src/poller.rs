// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-shot poll orchestrator.
//!
//! Connects the Particle reader, point construction, and the InfluxDB
//! writer into a single entry point.

use crate::batch::{Batch, BatchConfig};
use crate::client::{HttpConfig, InfluxClient};
use crate::config::PollerConfig;
use crate::error::PollError;
use crate::influx::{FieldValue, Point, PointError, Precision};
use crate::particle::ParticleClient;
use chrono::{DateTime, SubsecRound, Utc};

/// Measurement name of every written point.
pub const MEASUREMENT: &str = "temperature";

/// Tag key and value attached to every point.
pub const LOCATION_TAG: (&str, &str) = ("location", "control-room-shelf");

/// Field key holding the reading.
pub const CELSIUS_FIELD: &str = "celsius";

/// Build the point for one reading, truncating `now` to whole seconds.
pub fn temperature_point(celsius: f64, now: DateTime<Utc>) -> Result<Point, PointError> {
    Point::new(
        MEASUREMENT,
        vec![(LOCATION_TAG.0.to_string(), LOCATION_TAG.1.to_string())],
        vec![(CELSIUS_FIELD.to_string(), FieldValue::Float(celsius))],
        now.trunc_subsecs(0),
    )
}

/// Reads one temperature and writes it to InfluxDB.
pub struct Poller {
    config: PollerConfig,
    particle: ParticleClient,
    influx: InfluxClient,
}

impl Poller {
    /// Create a poller from configuration.
    pub fn new(config: PollerConfig) -> Result<Self, PollError> {
        let particle = ParticleClient::new(config.particle.clone())?;
        let influx = InfluxClient::new(HttpConfig {
            addr: config.influx.addr(),
            username: config.influx.username.clone(),
            password: config.influx.password.clone(),
        })?;

        Ok(Self {
            config,
            particle,
            influx,
        })
    }

    /// The InfluxDB client this poller writes through.
    pub fn influx(&self) -> &InfluxClient {
        &self.influx
    }

    /// Fetch, build, and write a single point.
    ///
    /// Nothing is written unless the reading was fetched and decoded.
    /// Returns the point that was written.
    pub fn poll_once(&self) -> Result<Point, PollError> {
        let celsius = self.particle.fetch_temperature()?;
        let point = temperature_point(celsius, Utc::now())?;

        let mut batch = Batch::new(BatchConfig {
            database: self.config.influx.database.clone(),
            precision: Precision::Seconds,
            retention_policy: self.config.influx.retention_policy.clone(),
        })?;
        batch.add_point(point.clone());

        self.influx.write(&batch)?;
        Ok(point)
    }
}
