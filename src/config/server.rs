// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use super::{env_opt, env_or};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Base of the `processed_image` URLs handed back to clients
    pub public_base_url: String,
    /// Annotated images are written here and served under /processed
    pub results_dir: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// Optional TOML treatment catalog replacing the built-in one
    pub treatments_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            public_base_url: "http://127.0.0.1:8000".to_string(),
            results_dir: PathBuf::from("results"),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            treatments_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env_opt("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            listen_addr: env_opt("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            public_base_url: env_opt("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            results_dir: env_opt("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            cors_allowed_origins,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            treatments_file: env_opt("TREATMENTS_FILE").map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid listen address '{}': {}", self.listen_addr, e))?;

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(format!(
                "Public base URL must be http(s): {}",
                self.public_base_url
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Public URL of an annotated image
    pub fn processed_url(&self, file_name: &str) -> String {
        format!(
            "{}/processed/{}",
            self.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}
