use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::model::DatasetKind;
use crate::error::DashboardError;

/// Optional config file looked up in the working directory.
pub const CONFIG_FILE: &str = "twins_viewer.json";

/// Mission length of the one-year ISS flight, in days.
pub const DEFAULT_MAX_DAYS: u32 = 340;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the fixed-path data files
    pub data_dir: PathBuf,

    /// Gene expression file name inside `data_dir`
    pub gene_file: String,

    /// Oxidative stress file name inside `data_dir`
    pub stress_file: String,

    /// Upper end of the duration slider
    pub max_days: u32,

    /// Start in upload mode
    pub use_uploader: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            gene_file: DatasetKind::GeneExpression.default_file_name().to_string(),
            stress_file: DatasetKind::OxidativeStress.default_file_name().to_string(),
            max_days: DEFAULT_MAX_DAYS,
            use_uploader: false,
        }
    }
}

impl AppConfig {
    /// Parse a JSON config file.
    pub fn load_from_file(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| DashboardError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Use `path` if it exists, otherwise defaults. An unreadable file is
    /// logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Fixed path for one dataset.
    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        match kind {
            DatasetKind::GeneExpression => self.data_dir.join(&self.gene_file),
            DatasetKind::OxidativeStress => self.data_dir.join(&self.stress_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.max_days, 340);
        assert!(!config.use_uploader);
        assert_eq!(
            config.path_for(DatasetKind::GeneExpression),
            Path::new("data").join("gene_expression.csv")
        );
        assert_eq!(
            config.path_for(DatasetKind::OxidativeStress),
            Path::new("data").join("oxidative_stress.csv")
        );
    }

    #[test]
    fn test_config_partial_file_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(br#"{ "data_dir": "/srv/twins", "max_days": 400 }"#)?;

        let config = AppConfig::load_from_file(file.path())?;
        assert_eq!(config.data_dir, PathBuf::from("/srv/twins"));
        assert_eq!(config.max_days, 400);
        assert_eq!(config.gene_file, "gene_expression.csv");
        Ok(())
    }

    #[test]
    fn test_config_invalid_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(file.path()),
            Err(DashboardError::Config { .. })
        ));
        assert_eq!(AppConfig::load_or_default(file.path()), AppConfig::default());
    }

    #[test]
    fn test_config_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, AppConfig::default());
    }
}
