// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shirokuma.toml` > `~/.config/shirokuma/shirokuma.toml`
//! > `/etc/shirokuma/shirokuma.toml`, with `SHIROKUMA_` environment overrides and
//! the unprefixed platform variables deployments already set.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ShirokumaConfig;

/// Unprefixed environment variables and the config keys they populate.
const PLATFORM_ENV: &[(&str, &str)] = &[
    ("channel_access_token", "line.channel_access_token"),
    ("channel_secret", "line.channel_secret"),
    ("line_channel_access_token", "line.channel_access_token"),
    ("line_channel_secret", "line.channel_secret"),
    ("openai_api_key", "openai.api_key"),
    ("port", "server.port"),
    ("secondary_webhook_url", "server.secondary_webhook_url"),
    ("cloudinary_url", "cloudinary.url"),
    ("cloudinary_cloud_name", "cloudinary.cloud_name"),
    ("cloudinary_api_key", "cloudinary.api_key"),
    ("cloudinary_api_secret", "cloudinary.api_secret"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shirokuma/shirokuma.toml` (system-wide)
/// 3. `~/.config/shirokuma/shirokuma.toml` (user XDG config)
/// 4. `./shirokuma.toml` (local directory)
/// 5. Unprefixed platform variables (`LINE_CHANNEL_SECRET`, `PORT`, ...)
/// 6. `SHIROKUMA_*` environment variables
pub fn load_config() -> Result<ShirokumaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ShirokumaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShirokumaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShirokumaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShirokumaConfig::default()))
        .merge(Toml::file(path))
        .merge(platform_env_provider())
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/shirokuma/shirokuma.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("shirokuma/shirokuma.toml"));
    }
    paths.push(PathBuf::from("shirokuma.toml"));
    paths
}

/// The layered Figment behind [`load_config`].
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(ShirokumaConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(platform_env_provider())
        .merge(env_provider())
}

/// Maps the unprefixed deployment variables onto their config keys.
fn platform_env_provider() -> Env {
    let names: Vec<&str> = PLATFORM_ENV.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let lowered = key.as_str().to_ascii_lowercase();
        PLATFORM_ENV
            .iter()
            .find(|(env, _)| *env == lowered)
            .map(|(_, target)| target.to_string())
            .unwrap_or(lowered)
            .into()
    })
}

/// Create the `SHIROKUMA_` provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SHIROKUMA_LINE_CHANNEL_SECRET` must map to
/// `line.channel_secret`, not `line.channel.secret`.
fn env_provider() -> Env {
    Env::prefixed("SHIROKUMA_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = [
            "server", "line", "openai", "calendar", "assets", "dispatch", "report", "cloudinary",
        ]
        .iter()
        .find_map(|section| {
            key_str
                .strip_prefix(&format!("{section}_"))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(key_str);
        mapped.into()
    })
}
