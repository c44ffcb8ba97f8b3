//! # Configuration
//!
//! Optional TOML settings for the `stegano` binary. Every field has a default, so a missing
//! file, section or key falls back to built-in behaviour.
//!
//! ```toml
//! [output]
//! suffix = "_encoded"
//! directory = "outputs"
//!
//! [encode]
//! require_auth = true
//!
//! [logging]
//! level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StegoError};
use crate::processing::steganography::{default_output_path, DEFAULT_OUTPUT_SUFFIX};

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("stegano.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path.as_ref())?;
    let config: T = toml::from_str(&content).map_err(|e| {
        StegoError::Config(format!("{}: {}", path.as_ref().display(), e))
    })?;
    Ok(config)
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub output: OutputConfig,
    pub encode: EncodeConfig,
    pub logging: LoggingConfig,
}

impl StegoConfig {
    /// Loads `path` if given, otherwise returns the defaults.
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => load_config(path),
            None => Ok(StegoConfig::default()),
        }
    }
}

/// Where encoded images are written when no explicit output path is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the input file stem, before `.png`
    pub suffix: String,
    /// Directory for encoded images; next to the input when unset
    pub directory: Option<PathBuf>,
}

impl OutputConfig {
    /// Where to write the encoded version of `input`.
    ///
    /// `explicit` wins when given. Otherwise `<stem><suffix>.png` in `directory`, or next to
    /// the input when no directory is configured.
    pub fn resolve(&self, input: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => default_output_path(input, &self.suffix, self.directory.as_deref()),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Protect every encoded message with an auth code, as if `--auth` were passed
    pub require_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The configured level, or `Info` if it does not parse.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StegoConfig::default();
        assert_eq!(config.output.suffix, "_encoded");
        assert!(config.output.directory.is_none());
        assert!(!config.encode.require_auth);
        assert_eq!(config.logging.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stegano.toml");
        fs::write(&path, "[encode]\nrequire_auth = true\n\n[logging]\nlevel = \"debug\"\n").unwrap();

        let config: StegoConfig = load_config(&path).unwrap();
        assert!(config.encode.require_auth);
        assert_eq!(config.logging.level_filter(), LevelFilter::Debug);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_output_resolve() {
        let input = Path::new("/photos/cat.jpg");
        let defaults = OutputConfig::default();
        assert_eq!(
            defaults.resolve(input, None),
            PathBuf::from("/photos/cat_encoded.png")
        );
        assert_eq!(
            defaults.resolve(input, Some(Path::new("/tmp/x.png"))),
            PathBuf::from("/tmp/x.png")
        );

        let configured = OutputConfig {
            suffix: "_hidden".to_string(),
            directory: Some(PathBuf::from("/outputs")),
        };
        assert_eq!(
            configured.resolve(input, None),
            PathBuf::from("/outputs/cat_hidden.png")
        );
    }

    #[test]
    fn test_bad_level_falls_back() {
        let logging = LoggingConfig {
            level: "loud".to_string(),
        };
        assert_eq!(logging.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[output\nsuffix = 3").unwrap();
        assert!(matches!(
            load_config::<StegoConfig>(&path),
            Err(StegoError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            StegoConfig::from_optional_file(Some(Path::new("/nonexistent/stegano.toml"))),
            Err(StegoError::Io(_))
        ));
        assert!(StegoConfig::from_optional_file(None).is_ok());
    }
}
