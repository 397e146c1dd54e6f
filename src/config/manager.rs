use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::config::{ConfigError, LedgerConfig};

const CONFIG_FILE: &str = "ledger.json";
const TMP_SUFFIX: &str = "tmp";

/// Handles persistence of [`LedgerConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE)))
    }

    /// `<config dir>/ledger_core/ledger.json`, when the platform has a config dir.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .map(|base| base.join("ledger_core").join(CONFIG_FILE))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<LedgerConfig, ConfigError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(LedgerConfig::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: LedgerConfig =
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
