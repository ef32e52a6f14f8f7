// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization.
//!
//! The crate itself only emits through the `log` facade (targets carry a
//! `[registry]`, `[node]`, `[publisher]`... prefix). These helpers install
//! `env_logger` for binaries and host runtimes that have no logger of their
//! own. Libraries embedding tether should install their own instead.

use crate::{Error, Result};
use log::LevelFilter;

/// Install a console logger at `level`.
///
/// # Errors
/// `AlreadyInitialized` if a global logger is already set.
pub fn init(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .try_init()
        .map_err(|_| Error::AlreadyInitialized)
}

/// Install a console logger honoring `RUST_LOG`, falling back to `default_level`.
pub fn init_from_env(default_level: LevelFilter) -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level.to_string()),
    )
    .format_timestamp_millis()
    .try_init()
    .map_err(|_| Error::AlreadyInitialized)
}

/// Install a console logger from a filter string such as `"tether=debug,info"`.
///
/// # Errors
/// `InvalidConfig` for an empty filter, `AlreadyInitialized` if a logger is set.
pub fn init_with_filter(filter: &str) -> Result<()> {
    if filter.trim().is_empty() {
        return Err(Error::InvalidConfig("empty log filter".to_string()));
    }

    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .try_init()
        .map_err(|_| Error::AlreadyInitialized)
}
