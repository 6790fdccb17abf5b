use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::{AppConfig, ConfigError, Result};

const DEFAULT_FILE: &str = "pagefile.toml";

/// Per-user configuration file, `<config dir>/pagefile/pagefile.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagefile").join(DEFAULT_FILE))
}

/// The file `load_config` reads when no path is given, if any exists.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_FILE);
    if local.exists() {
        return Some(local);
    }
    user_config_path().filter(|p| p.exists())
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            let pathbuf = PathBuf::from(p);
            if !pathbuf.exists() {
                return Err(ConfigError::io(
                    pathbuf,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "configuration file not found"),
                ));
            }
            builder = builder.add_source(File::from(pathbuf).format(FileFormat::Toml));
        }
        None => {
            if let Some(default_path) = default_config_path() {
                debug!(path = %default_path.display(), "Using default configuration file");
                builder = builder.add_source(File::from(default_path).format(FileFormat::Toml));
            }
        }
    }
    // Environment variable overrides, e.g., PAGEFILE__PROVIDER__PATH_CASE=lowercase
    builder = builder.add_source(
        Environment::with_prefix("PAGEFILE")
            .try_parsing(true)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("provider.benign_error_codes"),
    );
    let cfg = builder
        .build()
        .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
    // Validate
    merged.validate().map_err(ConfigError::Validation)?;
    Ok(merged)
}

pub fn load_config_with_default_path<P: AsRef<Path>>(path: Option<P>) -> Result<AppConfig> {
    let p = path
        .as_ref()
        .map(|p| p.as_ref().to_string_lossy().to_string());
    load_config(p.as_deref())
}
