use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RecipeError;

/// Where `save` and `list` put rendered documents
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaveTarget {
    /// The fixed local output folder (`output_dir`)
    #[default]
    Output,
    /// The recipe library (`directory`), the same folder `browse` reads
    Library,
}

/// Process settings, loaded once and passed to whatever needs them
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Recipe library directory
    #[serde(default)]
    pub directory: Option<String>,
    /// Fixed local output folder for saved recipes
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Destination for `save` and `list`
    #[serde(default)]
    pub save_target: SaveTarget,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Fall back to microdata when a page has no JSON-LD recipe
    #[serde(default = "default_wild_mode")]
    pub wild_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: None,
            output_dir: default_output_dir(),
            save_target: SaveTarget::default(),
            timeout: default_timeout(),
            wild_mode: default_wild_mode(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_timeout() -> u64 {
    30
}

fn default_wild_mode() -> bool {
    true
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PURE_RECIPE__ prefix
    /// 2. `path` if given, otherwise config.toml in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: PURE_RECIPE__DIRECTORY
    pub fn load(path: Option<&Path>) -> Result<Self, RecipeError> {
        let file = match path {
            // An explicitly named file must exist
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PURE_RECIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The configured recipe library, or `ConfigMissing` when unset or blank
    pub fn library_dir(&self) -> Result<PathBuf, RecipeError> {
        match self.directory.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
            _ => Err(RecipeError::ConfigMissing("directory")),
        }
    }

    /// Directory that `save` and `list` write into
    pub fn save_dir(&self) -> Result<PathBuf, RecipeError> {
        match self.save_target {
            SaveTarget::Output => Ok(self.output_dir.clone()),
            SaveTarget::Library => self.library_dir(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.save_target, SaveTarget::Output);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert!(settings.wild_mode);
        assert!(settings.directory.is_none());
    }

    #[test]
    fn test_library_dir_missing_or_blank() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.library_dir(),
            Err(RecipeError::ConfigMissing("directory"))
        ));

        settings.directory = Some("   ".to_string());
        assert!(matches!(
            settings.library_dir(),
            Err(RecipeError::ConfigMissing("directory"))
        ));

        settings.directory = Some("/recipes".to_string());
        assert_eq!(settings.library_dir().unwrap(), PathBuf::from("/recipes"));
    }

    #[test]
    fn test_save_dir_follows_target() {
        let mut settings = Settings {
            directory: Some("library".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.save_dir().unwrap(), PathBuf::from("out"));

        settings.save_target = SaveTarget::Library;
        assert_eq!(settings.save_dir().unwrap(), PathBuf::from("library"));

        settings.directory = None;
        assert!(settings.save_dir().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "directory = \"/home/cook/recipes\"\nsave_target = \"library\"\ntimeout = 5\nwild_mode = false"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.directory.as_deref(), Some("/home/cook/recipes"));
        assert_eq!(settings.save_target, SaveTarget::Library);
        assert_eq!(settings.timeout, 5);
        assert!(!settings.wild_mode);
        assert_eq!(settings.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = Settings::load(Some(Path::new("/definitely/not/here/config.toml")));
        assert!(matches!(result, Err(RecipeError::Config(_))));
    }
}
