// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration read from the environment
//!
//! `.env` is loaded by the binaries before any of these are built.

pub mod model;
pub mod server;

pub use model::ModelConfig;
pub use server::ServerConfig;

use std::str::FromStr;

/// Parse an environment variable, keeping `default` when unset or invalid
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("Ignoring invalid value for {}: {:?}", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

/// Non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
