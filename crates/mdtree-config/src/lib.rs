//! Configuration management for mdtree.
//!
//! Parses `mdtree.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdtree.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override sanitize mode.
    pub sanitize: Option<bool>,
    /// Override pedantic mode.
    pub pedantic: Option<bool>,
    /// Override smartypants.
    pub smartypants: Option<bool>,
    /// Override the heading id prefix.
    pub header_prefix: Option<String>,
    /// Override the output format.
    pub format: Option<OutputFormat>,
    /// Override pretty-printing of JSON output.
    pub pretty: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
    /// Output options.
    pub output: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkdownConfig {
    pub gfm: bool,
    pub tables: bool,
    pub breaks: bool,
    pub pedantic: bool,
    pub sanitize: bool,
    pub mangle: bool,
    pub smartypants: bool,
    /// Prepended to generated heading ids.
    pub header_prefix: String,
    /// Prepended to code block languages in the `class` attribute.
    pub lang_prefix: String,
    /// Opaque value handed to the renderer untouched.
    pub interpolations: Option<serde_json::Value>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            tables: true,
            breaks: false,
            pedantic: false,
            sanitize: false,
            mangle: true,
            smartypants: false,
            header_prefix: String::new(),
            lang_prefix: "lang-".to_owned(),
            interpolations: None,
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

/// Rendered output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Node tree as JSON.
    #[default]
    Json,
    /// Node tree serialized to HTML.
    Html,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(ConfigError::Validation(format!(
                "unknown output format: {other} (expected json or html)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Html => "html",
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to contain no whitespace.
fn require_no_whitespace(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain whitespace"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdtree.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(sanitize) = settings.sanitize {
            self.markdown.sanitize = sanitize;
        }
        if let Some(pedantic) = settings.pedantic {
            self.markdown.pedantic = pedantic;
        }
        if let Some(smartypants) = settings.smartypants {
            self.markdown.smartypants = smartypants;
        }
        if let Some(header_prefix) = &settings.header_prefix {
            self.markdown.header_prefix.clone_from(header_prefix);
        }
        if let Some(format) = settings.format {
            self.output.format = format;
        }
        if let Some(pretty) = settings.pretty {
            self.output.pretty = pretty;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_no_whitespace(&self.markdown.header_prefix, "markdown.header_prefix")?;
        require_no_whitespace(&self.markdown.lang_prefix, "markdown.lang_prefix")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.markdown.gfm);
        assert!(config.markdown.tables);
        assert!(config.markdown.mangle);
        assert!(!config.markdown.sanitize);
        assert_eq!(config.markdown.lang_prefix, "lang-");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.gfm);
        assert_eq!(config.markdown.header_prefix, "");
    }

    #[test]
    fn test_parse_markdown_config() {
        let toml = r#"
[markdown]
gfm = false
sanitize = true
header_prefix = "doc-"

[markdown.interpolations]
name = "World"
count = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.markdown.gfm);
        assert!(config.markdown.sanitize);
        assert!(config.markdown.tables);
        assert_eq!(config.markdown.header_prefix, "doc-");
        assert_eq!(
            config.markdown.interpolations,
            Some(serde_json::json!({ "name": "World", "count": 3 }))
        );
    }

    #[test]
    fn test_parse_output_config() {
        let toml = r#"
[output]
format = "html"
pretty = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.format, OutputFormat::Html);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_parse_unknown_format_fails() {
        let result: Result<Config, _> = toml::from_str("[output]\nformat = \"xml\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(ConfigError::Validation(_))
        ));
        assert_eq!(OutputFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            sanitize: Some(true),
            header_prefix: Some("h-".to_owned()),
            format: Some(OutputFormat::Html),
            ..CliSettings::default()
        });
        assert!(config.markdown.sanitize);
        assert!(!config.markdown.pedantic);
        assert_eq!(config.markdown.header_prefix, "h-");
        assert_eq!(config.output.format, OutputFormat::Html);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(!config.markdown.sanitize);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_rejects_whitespace_prefix() {
        let mut config = Config::default();
        config.markdown.header_prefix = "my prefix".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("markdown.header_prefix"));

        let mut config = Config::default();
        config.markdown.lang_prefix = "lang\t".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[markdown]\nsmartypants = true\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert!(config.markdown.smartypants);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtree.toml");
        std::fs::write(&path, "[markdown\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_validates_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtree.toml");
        std::fs::write(&path, "[markdown]\nlang_prefix = \"a b\"\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtree.toml");
        std::fs::write(&path, "[markdown]\nsanitize = true\n").unwrap();

        let settings = CliSettings {
            sanitize: Some(false),
            pretty: Some(false),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert!(!config.markdown.sanitize);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdtree.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            header_prefix: Some("a b".to_owned()),
            ..CliSettings::default()
        };
        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }

    #[test]
    fn test_discover_walks_up_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a/mdtree.toml"), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(dir.path().join("a/mdtree.toml"))
        );
    }

    #[test]
    fn test_discover_none_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x");
        std::fs::create_dir_all(&nested).unwrap();
        // A file in an ancestor of the temp dir would be found too; only check
        // the temp dir itself is skipped.
        let found = Config::discover_from(&nested);
        assert_ne!(found, Some(nested.join(CONFIG_FILENAME)));
        assert_ne!(found, Some(dir.path().join(CONFIG_FILENAME)));
    }
}
