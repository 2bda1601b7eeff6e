//! Configuration for the wcpt command-line tools.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, picked by extension), either
//!    given explicitly or found in the platform config directory,
//! 3. `WCPT_`-prefixed environment variables, with `__` separating nested
//!    keys (`WCPT_PRIVACY__POST_TYPE=wordcamp`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wcpt_privacy::{DEFAULT_MAX_PAGES, Settings};

const ENV_PREFIX: &str = "WCPT_";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "records.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the records.
    pub database: PathBuf,
    /// Whether the caller may read private records.
    pub read_private: bool,
    /// Register the (placeholder) personal data eraser.
    pub enable_eraser: bool,
    /// Upper bound on pages requested per exporter in a full export.
    pub max_pages: u32,
    pub privacy: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            read_private: false,
            enable_eraser: false,
            max_pages: DEFAULT_MAX_PAGES,
            privacy: Settings::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "WordCamp", "wcpt")
}

/// Configuration file looked up when none is given explicitly.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_database_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(DATABASE_FILE_NAME),
        None => PathBuf::from(DATABASE_FILE_NAME),
    }
}

impl Config {
    /// Load and validate configuration.
    ///
    /// An explicit `file` must exist. Without one, the default config file is
    /// used if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(database = %config.database.display(), "Configuration loaded");
        Ok(config)
    }

    /// The merged configuration sources, before extraction.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => figment = merge_file(figment, path)?,
            None => {
                if let Some(path) = default_config_path().filter(|path| path.is_file()) {
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.privacy.post_type.is_empty() {
            exn::bail!(ErrorKind::Invalid("privacy.post_type must not be empty"));
        }
        if self.privacy.catch_all_key.is_empty() {
            exn::bail!(ErrorKind::Invalid("privacy.catch_all_key must not be empty"));
        }
        if self.max_pages == 0 {
            exn::bail!(ErrorKind::Invalid("max_pages must be at least 1"));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    tracing::debug!(path = %path.display(), "Reading configuration file");
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.privacy.post_type, "wordcamp");
        assert_eq!(config.privacy.catch_all_key, "_application_data");
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert!(!config.enable_eraser);
        assert!(!config.read_private);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case("toml", "max_pages = 7\nenable_eraser = true\n[privacy]\npost_type = \"wp_meetup\"\n")]
    #[case("yaml", "max_pages: 7\nenable_eraser: true\nprivacy:\n  post_type: wp_meetup\n")]
    #[case("yml", "max_pages: 7\nenable_eraser: true\nprivacy:\n  post_type: wp_meetup\n")]
    #[case("json", r#"{"max_pages": 7, "enable_eraser": true, "privacy": {"post_type": "wp_meetup"}}"#)]
    fn test_file_formats(#[case] extension: &str, #[case] contents: &str) {
        let file = write_config(extension, contents);
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 7);
        assert!(config.enable_eraser);
        assert_eq!(config.privacy.post_type, "wp_meetup");
        // Unset nested keys keep their defaults.
        assert_eq!(config.privacy.catch_all_key, "_application_data");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let file = write_config("ini", "max_pages=7");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("toml", "max_pages = \"many\"");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[rstest]
    #[case("max_pages = 0")]
    #[case("[privacy]\npost_type = \"\"")]
    #[case("[privacy]\ncatch_all_key = \"\"")]
    fn test_invalid_values(#[case] contents: &str) {
        let file = write_config("toml", contents);
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("wcpt.toml", "max_pages = 7\ndatabase = \"from-file.sqlite\"")?;
            jail.set_env("WCPT_MAX_PAGES", "9");
            jail.set_env("WCPT_PRIVACY__CATCH_ALL_KEY", "_meetup_data");
            let config = Config::load(Some(Path::new("wcpt.toml"))).map_err(|err| format!("{err:?}"))?;
            assert_eq!(config.max_pages, 9);
            assert_eq!(config.database, PathBuf::from("from-file.sqlite"));
            assert_eq!(config.privacy.catch_all_key, "_meetup_data");
            Ok(())
        });
    }
}
