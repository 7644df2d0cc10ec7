//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast on malformed values. The optional
//! API token is wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::error::{Error, Result};
use crate::orchestrator::OrchestratorConfig;
use crate::session::SessionContext;
use secrecy::SecretString;
use std::str::FromStr;

pub const DEFAULT_API_BASE_URL: &str = "https://api.shiftlog.app";

#[derive(Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<SecretString>,
    pub sandbox_mode: bool,
    pub orchestrator: OrchestratorConfig,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let defaults = OrchestratorConfig::default();
        Ok(Self {
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            api_token: std::env::var("API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            sandbox_mode: flag_var("SANDBOX_MODE")?,
            orchestrator: OrchestratorConfig {
                timeout_ms: parsed_var("REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
                max_retries: parsed_var("MAX_RETRIES", defaults.max_retries)?,
                base_delay_ms: parsed_var("RETRY_BASE_DELAY_MS", defaults.base_delay_ms)?,
            },
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Session built from `API_TOKEN` and `SANDBOX_MODE`, for tools that
    /// have no interactive login.
    pub fn session(&self) -> SessionContext {
        SessionContext::anonymous()
            .token(self.api_token.clone())
            .sandbox(self.sandbox_mode)
    }
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{name}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

fn flag_var(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(Error::Config(format!("{name}={raw:?} is not a boolean"))),
        },
        Err(_) => Ok(false),
    }
}
