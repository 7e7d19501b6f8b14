//! HTTP server settings from the environment.

use crate::errors::{Error, Result};
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const MIN_SECRET_LEN: usize = 32;

/// Settings for the `momentum` server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// HMAC secret used to verify session tokens (`SESSION_SECRET`)
    pub session_secret: String,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `SESSION_SECRET`.
    ///
    /// # Errors
    /// Fails when the secret is missing or shorter than 32 bytes, or the bind
    /// address does not parse.
    pub fn from_env() -> Result<Self> {
        let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let secret = std::env::var("SESSION_SECRET").map_err(|_| Error::Config {
            message: "SESSION_SECRET is required".to_string(),
        })?;
        Self::new(&bind, secret)
    }

    /// Validates explicit settings.
    pub fn new(bind: &str, session_secret: String) -> Result<Self> {
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config {
                message: format!("SESSION_SECRET must be at least {MIN_SECRET_LEN} characters"),
            });
        }
        let bind_addr = bind.parse().map_err(|e| Error::Config {
            message: format!("Invalid BIND_ADDR {bind}: {e}"),
        })?;
        Ok(Self {
            bind_addr,
            session_secret,
        })
    }
}
