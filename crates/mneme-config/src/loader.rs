// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Compiled defaults are overridden by `/etc/mneme/mneme.toml`, then the
//! user's XDG config, then `./mneme.toml`, then `MNEME_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MnemeConfig;

/// Load the full layered configuration.
pub fn load_config() -> Result<MnemeConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overridden by an in-memory TOML document. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<MnemeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then `path`, then `MNEME_*` variables. The standard files are skipped.
pub fn load_config_from_path(path: &Path) -> Result<MnemeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Candidate config files, lowest priority first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/mneme/mneme.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("mneme").join("mneme.toml"));
    }
    paths.push(PathBuf::from("mneme.toml"));
    paths
}

/// The layered Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(MnemeConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "general",
    "storage",
    "embedding",
    "ingest",
    "retrieval",
    "persona",
    "conversation",
    "generation",
];

/// `MNEME_RETRIEVAL_TOP_K` becomes `retrieval.top_k`. Splitting on every
/// underscore would break keys such as `top_k`, so only the section prefix
/// is split off.
fn env_provider() -> Env {
    Env::prefixed("MNEME_").map(|key| map_env_key(key.as_str()).into())
}

/// Replace the first underscore after a known section name with a dot.
fn map_env_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}
