use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Directory holding one JSON file per stored record.
    pub data_dir: PathBuf,
    /// Length of a simulated device scan in seconds.
    pub device_scan_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            data_dir: PathBuf::from(optional("DATA_DIR", "data")),
            device_scan_secs: optional("DEVICE_SCAN_SECS", "3")
                .parse()
                .context("DEVICE_SCAN_SECS must be a non-negative integer")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn device_scan_duration(&self) -> Duration {
        Duration::from_secs(self.device_scan_secs)
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
