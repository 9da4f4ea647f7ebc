use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use invoice_core::{FileStore, KeyValueStore, Letterhead, SqliteStore};
use log::debug;
use serde::Deserialize;

/// Overrides `storage.data_dir` from the config file.
pub const DATA_DIR_ENV: &str = "INVOICE_DATA_DIR";

const CONFIG_FILE: &str = "config.toml";
const SQLITE_FILE: &str = "history.db";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub letterhead: Letterhead,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub compress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("."),
            compress: true,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "invoice-generator", "invoice")
}

/// `config.toml` in the platform config directory, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    pub fn parse(text: &str) -> Result<Config> {
        toml::from_str(text).context("invalid config")
    }

    /// An explicit path must exist; the default location may be absent,
    /// in which case built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Config::default());
                }
            },
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Config::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Environment first, then the config file, then the platform data dir.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir_with(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn data_dir_with(&self, env_override: Option<PathBuf>) -> PathBuf {
        env_override
            .or_else(|| self.storage.data_dir.clone())
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".invoice-data"))
    }

    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let dir = self.data_dir();
        debug!("opening {:?} store in {}", self.storage.backend, dir.display());
        Ok(match self.storage.backend {
            Backend::File => Box::new(FileStore::new(dir)),
            Backend::Sqlite => Box::new(
                SqliteStore::open(dir.join(SQLITE_FILE))
                    .context("failed to open history database")?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.letterhead.name, "ACME CORPORATION");
        assert_eq!(config.storage.backend, Backend::File);
        assert!(config.output.compress);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse(
            r#"
            [letterhead]
            name = "Initech"
            lines = ["1 Office Park", "billing@initech.test"]

            [storage]
            backend = "sqlite"
            data_dir = "/var/lib/invoices"

            [output]
            compress = false
            "#,
        )
        .unwrap();
        assert_eq!(config.letterhead.name, "Initech");
        assert_eq!(config.letterhead.lines.len(), 2);
        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert!(!config.output.compress);
        assert_eq!(config.data_dir_with(None), PathBuf::from("/var/lib/invoices"));
    }

    #[test]
    fn environment_wins_over_file() {
        let config = Config::parse("[storage]\ndata_dir = \"/from/file\"").unwrap();
        assert_eq!(
            config.data_dir_with(Some(PathBuf::from("/from/env"))),
            PathBuf::from("/from/env")
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Config::parse("[storage]\nbackend = \"redis\"").is_err());
    }
}
