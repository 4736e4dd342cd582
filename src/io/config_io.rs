use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ParserConfig;

/// Error type for loading and validating parser configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("could not compile sigil patterns: {0}")]
    PatternError(#[from] regex::Error),
}

/// Read parser markers from a TOML file. Missing keys take their defaults.
pub fn read_config(path: &Path) -> Result<ParserConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text)
}

/// Parse and validate parser markers from TOML text
pub fn parse_config(text: &str) -> Result<ParserConfig, ConfigError> {
    let config: ParserConfig = toml::from_str(text)?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject configurations that would make markers ambiguous
pub fn validate_config(config: &ParserConfig) -> Result<(), ConfigError> {
    let required = [
        ("archive_label", &config.archive_label),
        ("complete_label", &config.complete_label),
        ("date_trigger", &config.date_trigger),
        ("time_trigger", &config.time_trigger),
        ("settings_marker", &config.settings_marker),
        ("archive_marker", &config.archive_marker),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
        }
    }
    if config.date_trigger == config.time_trigger {
        return Err(ConfigError::Invalid(
            "date_trigger and time_trigger must differ".to_string(),
        ));
    }
    if !matches!(config.archive_marker.trim(), "***" | "---" | "___") {
        return Err(ConfigError::Invalid(format!(
            "archive_marker must be a thematic break, got {:?}",
            config.archive_marker
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            r#"archive_label = "Archiv"
complete_label = "Erledigt"
"#,
        )
        .unwrap();
        assert_eq!(config.archive_label, "Archiv");
        assert_eq!(config.complete_label, "Erledigt");
        assert_eq!(config.date_trigger, "@");
    }

    #[test]
    fn test_rejects_equal_triggers() {
        let err = parse_config("date_trigger = \"@\"\ntime_trigger = \"@\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_empty_label() {
        let err = parse_config("archive_label = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("archive_label"));
    }

    #[test]
    fn test_rejects_non_break_archive_marker() {
        let err = parse_config("archive_marker = \"===\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_read_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.toml");
        fs::write(&path, "time_trigger = \"%%\"\n").unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.time_trigger, "%%");
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_config(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
