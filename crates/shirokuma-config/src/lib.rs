// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Shirokuma diagnosis service.
//!
//! Settings come from `shirokuma.toml` files (unknown keys are rejected),
//! the bare platform variables deployments already set (`LINE_CHANNEL_SECRET`,
//! `OPENAI_API_KEY`, `PORT`, ...) and `SHIROKUMA_*` overrides. Failures are
//! reported as miette diagnostics.
//!
//! ```no_run
//! let config = shirokuma_config::load_and_validate().expect("config errors");
//! println!("listening on port {}", config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ShirokumaConfig;

/// Loads from the standard locations and validates the result.
pub fn load_and_validate() -> Result<ShirokumaConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::search_paths()
            .into_iter()
            .filter_map(|path| read_source(&absolute(path)))
            .collect()
    })
}

/// Loads one file plus environment overrides and validates the result.
pub fn load_and_validate_path(path: &Path) -> Result<ShirokumaConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(&absolute(path.to_path_buf())).into_iter().collect()
    })
}

/// Validates TOML given inline. No files or environment are consulted.
pub fn load_and_validate_str(toml_content: &str) -> Result<ShirokumaConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![(diagnostic::INLINE_SOURCE.to_string(), toml_content.to_string())]
    })
}

/// Runs validation on a loaded config, or turns the load error into
/// diagnostics. Sources are only read when there is an error to point into.
fn checked(
    loaded: Result<ShirokumaConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ShirokumaConfig, Vec<ConfigError>> {
    let config =
        loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|dir| dir.join(&path))
        .unwrap_or(path)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}
