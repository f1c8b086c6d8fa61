use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// Command text that turns on per-statement plan statistics.
pub const DEFAULT_PROFILE_STATEMENT: &str = "set statistics profile on";

/// Root configuration, parsed from TOML or any registered `ConfigParser`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Statement issued on the session before a profiled query.
    #[serde(default = "default_profile_statement")]
    pub profile_statement: String,

    /// What happens to a raw result set that no statistics block follows.
    #[serde(default)]
    pub unprofiled_results: UnprofiledPolicy,

    #[serde(default)]
    pub compare: CompareConfig,
}

fn default_profile_statement() -> String {
    DEFAULT_PROFILE_STATEMENT.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile_statement: default_profile_statement(),
            unprofiled_results: UnprofiledPolicy::default(),
            compare: CompareConfig::default(),
        }
    }
}

/// Handling of raw result sets without a following statistics block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnprofiledPolicy {
    /// Never emitted. Matches the wire behaviour of the profiled reader.
    #[default]
    Drop,
    /// Emitted as a profiled result with no statistics.
    Emit,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompareConfig {
    /// Sort both sides before comparing row by row.
    #[serde(default)]
    pub ignore_ordering: bool,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}

/// Config file format loader, selected by file extension.
pub trait ConfigParser {
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<EngineConfig, EngineError>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<EngineConfig, EngineError> {
        EngineConfig::parse(content)
    }
}

/// Load a config file with the first parser that claims its extension.
pub fn load_config(path: &str, parsers: &[&dyn ConfigParser]) -> Result<EngineConfig, EngineError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| EngineError::Config(format!("{path}: missing file extension")))?;
    let parser = parsers
        .iter()
        .find(|p| p.extensions().contains(&ext))
        .ok_or_else(|| EngineError::Config(format!("{path}: no parser for '.{ext}'")))?;
    let content = std::fs::read_to_string(path)?;
    parser.parse(&content).map_err(|e| e.with_context(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.profile_statement, "set statistics profile on");
        assert_eq!(config.unprofiled_results, UnprofiledPolicy::Drop);
        assert!(!config.compare.ignore_ordering);
    }

    #[test]
    fn test_parse_overrides() {
        let config = EngineConfig::parse(
            r#"
            profile_statement = "SET STATISTICS PROFILE ON"
            unprofiled_results = "emit"

            [compare]
            ignore_ordering = true
            "#,
        )
        .unwrap();
        assert_eq!(config.profile_statement, "SET STATISTICS PROFILE ON");
        assert_eq!(config.unprofiled_results, UnprofiledPolicy::Emit);
        assert!(config.compare.ignore_ordering);
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        let err = EngineConfig::parse(r#"unprofiled_results = "keep""#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_load_config_without_matching_parser() {
        let err = load_config("engine.yaml", &[&TomlParser]).unwrap_err();
        assert!(err.to_string().contains("no parser for '.yaml'"));
    }
}
