use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid toc levels {levels:?} in {config_path}, expected e.g. \"1..6\"")]
    InvalidTocLevels { config_path: PathBuf, levels: String },
}

/// Delimiter used when toggling italic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItalicIndicator {
    #[default]
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "_")]
    Underscore,
}

impl ItalicIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItalicIndicator::Asterisk => "*",
            ItalicIndicator::Underscore => "_",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItalicConfig {
    pub indicator: ItalicIndicator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Inclusive heading level range, `"2..4"`.
    pub levels: String,
    pub ordered_list: bool,
    pub plaintext: bool,
    pub tab_size: usize,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            levels: "1..6".to_string(),
            ordered_list: false,
            plaintext: false,
            tab_size: 2,
        }
    }
}

impl TocConfig {
    /// `(min, max)` of the level range, `None` unless `1 <= min <= max <= 6`.
    pub fn level_bounds(&self) -> Option<(u8, u8)> {
        let (min, max) = self.levels.split_once("..")?;
        let min: u8 = min.trim().parse().ok()?;
        let max: u8 = max.trim().parse().ok()?;
        (1 <= min && min <= max && max <= 6).then_some((min, max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub img_to_base64: bool,
    pub absolute_img_path: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            img_to_base64: false,
            absolute_img_path: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub breaks: bool,
    pub font_family: String,
    pub font_size: u32,
    pub line_height: f64,
    /// Stylesheet URLs or paths; paths get `~` and `$VAR` expansion on load.
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub italic: ItalicConfig,
    pub toc: TocConfig,
    pub print: PrintConfig,
    pub preview: PreviewConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.toc.level_bounds().is_none() {
            return Err(ConfigError::InvalidTocLevels {
                config_path: config_path.to_path_buf(),
                levels: config.toc.levels,
            });
        }

        // Expand shell variables and tilde in local stylesheet paths
        for style in &mut config.preview.styles {
            if !style.starts_with("http://") && !style.starts_with("https://") {
                *style = Self::expand_path(style).unwrap_or_else(|| style.clone());
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-assist");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &str) -> Option<String> {
        shellexpand::full(path)
            .ok()
            .map(|expanded| expanded.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-assist/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.italic.indicator.as_str(), "*");
        assert_eq!(config.toc.level_bounds(), Some((1, 6)));
        assert_eq!(config.toc.tab_size, 2);
        assert!(config.print.absolute_img_path);
        assert!(!config.print.img_to_base64);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[italic]
indicator = "_"

[toc]
levels = "2..4"
ordered_list = true

[preview]
font_size = 15
line_height = 1.6
"#,
        )
        .unwrap();

        assert_eq!(config.italic.indicator, ItalicIndicator::Underscore);
        assert_eq!(config.toc.level_bounds(), Some((2, 4)));
        assert!(config.toc.ordered_list);
        assert!(!config.toc.plaintext);
        assert_eq!(config.preview.font_size, 15);
        assert_eq!(config.preview.line_height, 1.6);
        assert_eq!(config.print, PrintConfig::default());
    }

    #[test]
    fn test_level_bounds_validation() {
        let bounds = |levels: &str| {
            TocConfig {
                levels: levels.to_string(),
                ..Default::default()
            }
            .level_bounds()
        };

        assert_eq!(bounds(" 1 .. 3 "), Some((1, 3)));
        assert_eq!(bounds("3..3"), Some((3, 3)));
        assert_eq!(bounds("4..2"), None);
        assert_eq!(bounds("0..6"), None);
        assert_eq!(bounds("1..7"), None);
        assert_eq!(bounds("all"), None);
    }

    #[test]
    fn test_unknown_italic_indicator_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[italic]\nindicator = \"/\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_invalid_levels_are_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[toc]\nlevels = \"6..1\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(err.to_string().contains("6..1"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = Config::default();
        test_config.toc.levels = "2..3".to_string();
        test_config.print.img_to_base64 = true;
        test_config.preview.styles = vec!["https://example.com/a.css".to_string()];

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_style_paths_are_expanded_on_load() {
        unsafe {
            env::set_var("MD_ASSIST_STYLES", "/custom/styles");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            r#"
[preview]
styles = ["$MD_ASSIST_STYLES/print.css", "~/theme.css", "https://cdn.example.com/$X.css"]
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.preview.styles[0], "/custom/styles/print.css");
        assert!(!config.preview.styles[1].starts_with('~'));
        assert!(config.preview.styles[1].ends_with("theme.css"));
        assert_eq!(config.preview.styles[2], "https://cdn.example.com/$X.css");

        unsafe {
            env::remove_var("MD_ASSIST_STYLES");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        assert_eq!(
            Config::expand_path("relative/path"),
            Some("relative/path".to_string())
        );
    }
}
