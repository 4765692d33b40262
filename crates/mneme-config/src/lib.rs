// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Mneme.
//!
//! Strict TOML sections (`deny_unknown_fields`), layered file lookup with
//! `MNEME_*` overrides, range validation and miette diagnostics.
//!
//! ```no_run
//! let config = mneme_config::load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError, SourceFile};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MnemeConfig;

/// Load the layered configuration and validate it.
pub fn load_and_validate() -> Result<MnemeConfig, Vec<ConfigError>> {
    let sources = || {
        loader::config_file_paths()
            .into_iter()
            .filter_map(|path| read_source(&path))
            .collect::<Vec<_>>()
    };
    checked(loader::load_config(), sources)
}

/// Validate a TOML document layered over the defaults.
pub fn load_and_validate_str(toml_content: &str) -> Result<MnemeConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![SourceFile::new("<inline>", toml_content)]
    })
}

/// Load `path` (plus `MNEME_*` overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<MnemeConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Validate a loaded config, or turn the load error into diagnostics. File
/// contents are only read on the error path.
fn checked(
    loaded: Result<MnemeConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<SourceFile>,
) -> Result<MnemeConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read a config file under the name figment reports for it.
fn read_source(path: &Path) -> Option<SourceFile> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| PathBuf::from(path))
    };
    Some(SourceFile::new(name.display().to_string(), content))
}
