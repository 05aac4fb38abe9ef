//! Server descriptors and where they come from.
//!
//! Descriptors are either given inline as `redis://` URLs or read from a JSON
//! file holding an array of `{"host", "port", "password"?}` objects.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StatusError;

/// File name looked up next to the executable when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;

/// One Redis endpoint plus optional credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerDescriptor {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
}

impl ServerDescriptor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Registry key and panel heading: `host:port`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Password to send with AUTH, if any. Empty strings count as absent.
    pub fn auth_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Parse `redis://[:password@]host[:port]`. The database path, if any, is
    /// ignored because every populated database is inspected anyway.
    pub fn from_url(url_str: &str) -> Result<Self, StatusError> {
        let invalid = |reason: &str| StatusError::InvalidUrl {
            url: redact_url(url_str),
            reason: reason.to_string(),
        };

        let parsed = url::Url::parse(url_str).map_err(|e| invalid(&e.to_string()))?;
        if parsed.scheme() != "redis" {
            return Err(invalid("scheme must be redis://"));
        }
        // Bare IPv6 address, without the URL brackets
        let host = match parsed.host() {
            Some(url::Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(url::Host::Ipv4(v4)) => v4.to_string(),
            Some(url::Host::Ipv6(v6)) => v6.to_string(),
            _ => return Err(invalid("missing host")),
        };
        let port = parsed.port().unwrap_or(DEFAULT_PORT);

        let mut descriptor = Self::new(host, port);
        if let Some(password) = parsed.password() {
            descriptor = descriptor.with_password(password);
        }
        Ok(descriptor)
    }
}

impl Default for ServerDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Default config location: `config.json` beside the running binary.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Read descriptors from a JSON file.
///
/// A missing or unreadable file falls back to a single localhost descriptor.
/// A file that reads fine but does not parse is an error.
pub fn load_descriptors(path: &Path) -> Result<Vec<ServerDescriptor>, StatusError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Config file unreadable, falling back to {}:{}",
                DEFAULT_HOST,
                DEFAULT_PORT
            );
            return Ok(vec![ServerDescriptor::default()]);
        }
    };

    let descriptors: Vec<ServerDescriptor> =
        serde_json::from_str(&raw).map_err(|source| StatusError::Config {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        path = %path.display(),
        servers = descriptors.len(),
        "Loaded server config"
    );
    Ok(descriptors)
}

/// Parse inline `--server` URLs.
pub fn descriptors_from_urls<S: AsRef<str>>(
    urls: &[S],
) -> Result<Vec<ServerDescriptor>, StatusError> {
    urls.iter()
        .map(|u| ServerDescriptor::from_url(u.as_ref()))
        .collect()
}

/// Hide the password of a URL for logs and error messages.
pub fn redact_url(url_str: &str) -> String {
    match url::Url::parse(url_str) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}
