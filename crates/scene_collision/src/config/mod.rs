//! Configuration files
//!
//! Settings structs load from and save to `.toml` or `.ron` files; the
//! format follows the file extension. Loaded values are checked before
//! they are handed out.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// On-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// Rusty Object Notation
    Ron,
}

impl ConfigFormat {
    /// Format named by the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A settings struct with file persistence
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Consistency check run on every loaded value
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Parse `contents` in the given format, then check it
    fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
        };
        config.check().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Render in the given format
    fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let config = Self::parse(&std::fs::read_to_string(path)?, format)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.render(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Why a configuration could not be loaded or saved
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The contents are not valid for the format
    #[error("Parse error: {0}")]
    Parse(String),

    /// The value could not be rendered
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Parsed, but the values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
