//! Layered CLI configuration.
//!
//! Layers, lowest to highest: built-in defaults, the user config at
//! `<config_dir>/betwixt/config.toml`, the project config `./betwixt.toml`,
//! then command-line flags (applied by each command). Tables merge key by
//! key, so a project file only needs the keys it changes.
//!
//! ```toml
//! output = "text"
//! seed = 7
//!
//! [engine]
//! direction = "adaptive"
//! threads = 4
//!
//! [engine.thresholds]
//! forward_pull_density = 0.1
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use betwixt_core::BetweennessConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PROJECT_CONFIG_FILE: &str = "betwixt.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
    /// Seed for `--sample` when `--seed` is not given.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub engine: BetweennessConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output: None,
            seed: default_seed(),
            engine: BetweennessConfig::default(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("betwixt").join("config.toml"))
}

/// Load and merge every config layer that exists.
pub fn load_config(project_root: &Path) -> Result<CliConfig> {
    let mut layers: Vec<PathBuf> = user_config_path().into_iter().collect();
    layers.push(project_root.join(PROJECT_CONFIG_FILE));
    load_layers(&layers)
}

/// Merge the given files in order; missing files are skipped.
fn load_layers(paths: &[PathBuf]) -> Result<CliConfig> {
    let mut merged = toml::Table::new();
    for path in paths {
        if let Some(table) = read_table(path)? {
            debug!(path = %path.display(), "loaded config layer");
            merge_tables(&mut merged, table);
        }
    }

    let config: CliConfig = toml::Value::Table(merged)
        .try_into()
        .context("Invalid betwixt configuration")?;
    config
        .engine
        .validate()
        .context("Invalid [engine] configuration")?;
    Ok(config)
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let table = toml::from_str::<toml::Table>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(table))
}

/// Overlay `top` onto `base`: nested tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betwixt_core::DirectionPolicy;

    fn table(src: &str) -> toml::Table {
        toml::from_str(src).expect("toml")
    }

    #[test]
    fn empty_layers_give_defaults() {
        let config: CliConfig = toml::Value::Table(toml::Table::new())
            .try_into()
            .expect("defaults");
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn project_layer_overrides_user_layer_key_by_key() {
        let mut merged = table(
            "output = \"pretty\"\n[engine]\ndirection = \"push-only\"\nthreads = 2\n",
        );
        merge_tables(&mut merged, table("[engine]\nthreads = 8\n"));
        let config: CliConfig = toml::Value::Table(merged).try_into().expect("config");

        assert_eq!(config.output.as_deref(), Some("pretty"));
        assert_eq!(config.engine.direction, DirectionPolicy::PushOnly);
        assert_eq!(config.engine.threads, Some(8));
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_layers(&[dir.path().join("absent.toml")]).expect("load");
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn load_reads_project_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "seed = 9\n[engine.thresholds]\nforward_pull_density = 0.5\n",
        )
        .expect("write");
        let config = load_layers(&[dir.path().join(PROJECT_CONFIG_FILE)]).expect("load");
        assert_eq!(config.seed, 9);
        assert!((config.engine.thresholds.forward_pull_density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "seed = [").expect("write");
        let err = load_layers(&[dir.path().join(PROJECT_CONFIG_FILE)]).expect_err("bad toml");
        assert!(format!("{err:#}").contains(PROJECT_CONFIG_FILE));
    }

    #[test]
    fn invalid_engine_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[engine]\nthreads = 0\n")
            .expect("write");
        assert!(load_layers(&[dir.path().join(PROJECT_CONFIG_FILE)]).is_err());
    }
}
