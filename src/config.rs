//! Runtime configuration read from the environment.
//!
//! Every setting has a default so the server starts without any variables
//! set. `NOTEHUB_TOKEN` is optional and only forwarded to the remote API.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://notehub-public.goit.study/api";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_PER_PAGE: u32 = 12;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("NOTEHUB_API_URL is not a valid URL: {0}")]
    ApiUrl(#[from] url::ParseError),
    #[error("NOTEHUB_BIND is not a socket address: {0}")]
    Bind(String),
    #[error("NOTEHUB_PER_PAGE must be a positive integer, got {0:?}")]
    PerPage(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub api_token: Option<String>,
    pub bind: SocketAddr,
    pub per_page: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("NOTEHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(api_url.trim_end_matches('/'))?;

        let api_token = lookup("NOTEHUB_TOKEN").filter(|t| !t.trim().is_empty());

        let bind = lookup("NOTEHUB_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind.parse().map_err(|_| ConfigError::Bind(bind))?;

        let per_page = match lookup("NOTEHUB_PER_PAGE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::PerPage(raw)),
            },
            None => DEFAULT_PER_PAGE,
        };

        Ok(Self {
            api_url,
            api_token,
            bind,
            per_page,
        })
    }
}
