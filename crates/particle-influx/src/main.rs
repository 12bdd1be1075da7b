// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Particle to InfluxDB temperature poller CLI
//!
//! # Usage
//!
//! ```bash
//! # Plain HTTP to a local InfluxDB
//! particle-influx -db sensors -device 0123456789abcdef -token $TOKEN
//!
//! # Remote InfluxDB over https with credentials
//! particle-influx -secure -host influx.example.com -user writer -pass secret \
//!     -db sensors -device 0123456789abcdef -token $TOKEN
//! ```

use clap::CommandFactory;
use particle_influx::{Cli, ConfigError, Poller};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse_args(std::env::args_os());

    let filter = if cli.verbose {
        EnvFilter::new("particle_influx=debug")
    } else {
        EnvFilter::new("particle_influx=info")
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(ConfigError::MissingDatabase) => {
            eprintln!("{}", Cli::command().render_help());
            return ExitCode::from(1);
        }
    };

    tracing::debug!(
        influx = %config.influx.addr(),
        db = %config.influx.database,
        device = %config.particle.device,
        "Starting poll"
    );

    let poller = match Poller::new(config) {
        Ok(poller) => poller,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(1);
        }
    };

    match poller.poll_once() {
        Ok(point) => {
            tracing::info!(
                measurement = point.measurement(),
                time = %point.time(),
                "Wrote {}",
                point.to_line_protocol(particle_influx::Precision::Seconds)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(1)
        }
    }
}
