use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::auth::{DigestAlgorithm, HmacKey};

pub mod destinations;
pub use destinations::{Destination, DestinationTable};

pub const DEFAULT_BIND: &str = "0.0.0.0:80";
pub const DEFAULT_BOT_NAME: &str = "Deis Deployer";
pub const DEFAULT_EMOJI: &str = "nerd_face";
pub const DEFAULT_HTTP_SCHEME: &str = "http";

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat message presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageConfig {
    pub bot_name: String,
    pub emoji: String,
    pub pretext: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            emoji: DEFAULT_EMOJI.to_string(),
            pretext: String::new(),
        }
    }
}

/// Per-connection limits for the inbound server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLimits {
    pub request_timeout: Duration,
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_header_bytes: 8 * 1024,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Process configuration, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub debug: bool,
    pub hmac_key: Option<HmacKey>,
    pub hmac_algorithm: DigestAlgorithm,
    /// Scheme used when reconstructing the signed URL; never taken from the request.
    pub http_scheme: String,
    pub message: MessageConfig,
    pub destination: Destination,
    pub limits: ServerLimits,
    pub delivery_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an explicit variable map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Empty values count as unset, so `KEY=` behaves like a missing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let debug = var("DEBUG").is_some();

        let hmac_key = var("KEY").map(HmacKey::new);

        let hmac_algorithm = match var("HMAC_ALGORITHM") {
            Some(raw) => raw
                .parse::<DigestAlgorithm>()
                .map_err(|e| anyhow!("HMAC_ALGORITHM: {}", e))?,
            None => DigestAlgorithm::default(),
        };

        let http_scheme = var("HTTP_SCHEME").unwrap_or_else(|| DEFAULT_HTTP_SCHEME.to_string());

        let message = MessageConfig {
            bot_name: var("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
            emoji: var("EMOJI").unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
            pretext: var("PRETEXT").unwrap_or_default(),
        };

        let destination = match (var("HOOK_URL"), var("HOOK_URLS")) {
            (Some(_), Some(_)) => {
                return Err(anyhow!(
                    "HOOK_URL and HOOK_URLS are mutually exclusive; set exactly one"
                ))
            }
            (Some(raw), None) => Destination::Single(
                Url::parse(raw.trim()).map_err(|e| anyhow!("HOOK_URL is not a valid URL: {}", e))?,
            ),
            (None, Some(raw)) => Destination::ByApp(DestinationTable::parse(&raw)),
            // Unset or empty HOOK_URLS is an empty table: every app is unknown.
            (None, None) => Destination::ByApp(DestinationTable::default()),
        };

        let defaults = ServerLimits::default();
        let limits = ServerLimits {
            request_timeout: var("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_header_bytes: var("MAX_HEADER_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_header_bytes),
            max_body_bytes: var("MAX_BODY_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        };

        let delivery_timeout = var("DELIVERY_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let log_format = match var("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            bind: normalize_bind(var("BIND").as_deref()),
            debug,
            hmac_key,
            hmac_algorithm,
            http_scheme,
            message,
            destination,
            limits,
            delivery_timeout,
            log_format,
        })
    }

    /// Log the resolved settings. The HMAC key is never printed.
    pub fn log_summary(&self) {
        info!("Bind address: {}", self.bind);
        info!("HMAC algorithm: {}", self.hmac_algorithm);

        if self.hmac_key.is_none() {
            warn!("WARNING! HMAC key is empty; every request will be rejected");
        }
        if matches!(&self.destination, Destination::ByApp(table) if table.is_empty()) {
            warn!("WARNING! No hook URLs configured; every notification will be dropped");
        }
        if !self.debug {
            return;
        }

        warn!("DEBUG is set: expected signatures will be written to the log");

        info!("Bot name:   {}", self.message.bot_name);
        info!("Emoji icon: :{}:", self.message.emoji);
        info!("Pretext:    {}", self.message.pretext);
        info!("HTTP scheme: {}", self.http_scheme);

        match &self.destination {
            Destination::Single(url) => info!("Hook URL: {}", url),
            Destination::ByApp(table) => {
                info!("Hook URLs:");
                for (name, url) in table.iter() {
                    info!(" -> {}: {}", name, url);
                }
            }
        }
    }
}

/// `:8080` listens on every interface, as does an empty value on port 80.
fn normalize_bind(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => DEFAULT_BIND.to_string(),
        Some(addr) if addr.starts_with(':') => format!("0.0.0.0{}", addr),
        Some(addr) => addr.to_string(),
    }
}
