// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command-line configuration.
//!
//! Flags are accepted both as `--db` and in the single-dash form `-db`
//! used by existing cron entries.

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use thiserror::Error;

/// Default Particle cloud API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.particle.io";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no InfluxDB database given (-db)")]
    MissingDatabase,
}

/// Poll a Particle device temperature and write it to InfluxDB
#[derive(Parser, Debug, Clone)]
#[command(name = "particle-influx")]
#[command(about = "Poll a Particle device temperature and write it to InfluxDB")]
#[command(version)]
pub struct Cli {
    /// InfluxDB username
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub user: String,

    /// InfluxDB password
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub pass: String,

    /// InfluxDB use https?
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        require_equals = true
    )]
    pub secure: bool,

    /// InfluxDB hostname
    #[arg(long, default_value = "localhost", allow_hyphen_values = true)]
    pub host: String,

    /// InfluxDB port
    #[arg(long, default_value = "8086", allow_hyphen_values = true)]
    pub port: String,

    /// InfluxDB database
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub db: String,

    /// InfluxDB retention policy (database default if unset)
    #[arg(long, allow_hyphen_values = true)]
    pub rp: Option<String>,

    /// Particle device ID
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub device: String,

    /// Particle API access token
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub token: String,

    /// Verbose mode (debug logs)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse from an argument list, accepting single-dash long flags.
    pub fn parse_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_flags(args))
    }

    /// Fallible variant of [`Cli::parse_args`].
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_flags(args))
    }

    /// Validate and convert into the typed poller configuration.
    pub fn into_config(self) -> Result<PollerConfig, ConfigError> {
        if self.db.is_empty() {
            return Err(ConfigError::MissingDatabase);
        }

        let scheme = if self.secure {
            Scheme::Https
        } else {
            Scheme::Http
        };

        Ok(PollerConfig {
            particle: ParticleConfig {
                api_base: DEFAULT_API_BASE.to_string(),
                device: self.device,
                token: self.token,
            },
            influx: InfluxConfig {
                scheme,
                host: self.host,
                port: self.port,
                database: self.db,
                username: self.user,
                password: self.pass,
                retention_policy: self.rp,
            },
        })
    }
}

/// Long flags that take a separate value argument.
const VALUE_FLAGS: &[&str] = &["user", "pass", "host", "port", "db", "rp", "device", "token"];

/// Rewrite `-name[=value]` into `--name[=value]`.
///
/// Only arguments in flag position are rewritten: the argument following a
/// value-taking flag written without `=` is passed through untouched, so
/// `-pass -s3cret` keeps its value. Single-character flags (`-v`), `--`
/// flags, a bare `-`, and negative numbers are left alone. The first element
/// (program name) is never touched.
pub fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut value_next = false;

    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || value_next {
            value_next = false;
            out.push(arg);
            continue;
        }

        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        let long = if is_single_dash_long(s) {
            Some(format!("-{}", s))
        } else if s.starts_with("--") && s.len() > 2 {
            Some(s.to_string())
        } else {
            None
        };

        match long {
            Some(flag) => {
                value_next = !flag.contains('=') && VALUE_FLAGS.contains(&&flag[2..]);
                out.push(OsString::from(flag));
            }
            None => out.push(arg),
        }
    }

    out
}

fn is_single_dash_long(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or("");
    name.len() > 1 && name.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Transport scheme for the InfluxDB connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Particle cloud settings.
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// API base URL, normally [`DEFAULT_API_BASE`].
    pub api_base: String,
    /// Device ID whose `temp` variable is read.
    pub device: String,
    /// API access token.
    pub token: String,
}

/// InfluxDB connection settings.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub scheme: Scheme,
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub retention_policy: Option<String>,
}

impl InfluxConfig {
    /// `scheme://host:port`
    pub fn addr(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

/// Everything one poll needs.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub particle: ParticleConfig,
    pub influx: InfluxConfig,
}
