// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Particle cloud variable reader.
//!
//! Reads the `temp` variable of one device:
//!
//! ```text
//! GET {api_base}/v1/devices/{device}/temp?access_token={token}
//! ```

use crate::config::ParticleConfig;
use crate::error::PollError;
use reqwest::blocking::Client;
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Name of the device variable holding the temperature.
pub const TEMPERATURE_VARIABLE: &str = "temp";

/// Key of the variable value in the read response.
const RESULT_KEY: &str = "result";

/// Blocking client for the Particle device variable API.
pub struct ParticleClient {
    http: Client,
    config: ParticleConfig,
}

impl ParticleClient {
    pub fn new(config: ParticleConfig) -> Result<Self, PollError> {
        Ok(Self {
            http: Client::builder().build()?,
            config,
        })
    }

    /// URL of the temperature variable, without the access token.
    pub fn variable_url(&self) -> String {
        format!(
            "{}/v1/devices/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.device,
            TEMPERATURE_VARIABLE
        )
    }

    /// Fetch the current temperature reading in degrees Celsius.
    pub fn fetch_temperature(&self) -> Result<f64, PollError> {
        let url = self.variable_url();
        tracing::debug!(%url, "Reading Particle variable");

        let response = self
            .http
            .get(&url)
            .query(&[("access_token", self.config.token.as_str())])
            .send()
            .map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status { status });
        }

        let body = response.bytes().map_err(redact)?;
        let reading = decode_reading(&body)?;
        tracing::debug!(celsius = reading, "Decoded Particle reading");
        Ok(reading)
    }
}

/// Drop the request URL from transport errors; its query carries the access token.
fn redact(e: reqwest::Error) -> PollError {
    PollError::Request(e.without_url())
}

/// Decode the variable value out of a response body.
///
/// The key is matched case-insensitively (`result`, `Result`, `RESULT`, ...).
/// An exact `Result` or `result` key wins over other spellings.
pub fn decode_reading(body: &[u8]) -> Result<f64, PollError> {
    let object: Map<String, Value> = serde_json::from_slice(body)?;

    let value = object
        .get("Result")
        .or_else(|| object.get(RESULT_KEY))
        .or_else(|| {
            object
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(RESULT_KEY))
                .map(|(_, v)| v)
        })
        .ok_or_else(|| serde_json::Error::missing_field(RESULT_KEY))?;

    Ok(f64::deserialize(value)?)
}
