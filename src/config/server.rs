use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Server configuration for the HTTP server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| AppError::Configuration("Invalid SERVER_PORT".to_string()))?,
            workers: env::var("SERVER_WORKERS")
                .ok()
                .map(|raw| {
                    raw.parse()
                        .map_err(|_| AppError::Configuration("Invalid SERVER_WORKERS".to_string()))
                })
                .transpose()?
                .unwrap_or_else(default_workers),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// 2x CPU cores for an I/O-bound workload
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
}
