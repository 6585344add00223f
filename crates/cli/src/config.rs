//! Configuration file support for grouping runs

use anyhow::{Context, Result};
use kwgroup_core::{GroupingConfig, PipelineConfig};
use kwgroup_filters::NormalizerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete run configuration; command-line flags override file values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Keyword export with search volumes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PathBuf>,
    /// Grouped JSONL output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Flat TSV or JSONL export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<PathBuf>,
    /// Number of threads (None = auto-detect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    pub normalizer: NormalizerConfig,
    pub grouping: GroupingConfig,
}

impl RunConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Engine configuration for this run
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            normalizer: self.normalizer.clone(),
            grouping: self.grouping.clone(),
            num_threads: self.num_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RunConfig {
        let mut config = RunConfig {
            input: Some(PathBuf::from("keywords.jsonl")),
            output: Some(PathBuf::from("groups.jsonl")),
            ..Default::default()
        };
        config.normalizer.extended_irregulars = true;
        config.normalizer.extra_stop_words.push("cheap".to_string());
        config
            .normalizer
            .extra_irregulars
            .insert("cacti".to_string(), "cactus".to_string());
        config.grouping.chunk_size = 2_000;
        config
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kwgroup.yaml");

        sample().save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), sample());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kwgroup.toml");

        sample().save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), sample());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "input = \"k.txt\"\n\n[normalizer]\nextended_irregulars = true\n").unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("k.txt")));
        assert!(config.normalizer.extended_irregulars);
        assert_eq!(config.grouping, GroupingConfig::default());

        let pipeline = config.pipeline_config();
        assert!(pipeline.normalizer.extended_irregulars);
        assert!(pipeline.num_threads.is_none());
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kwgroup.json");
        assert!(sample().save(&path).is_err());
        assert!(RunConfig::load(&path).is_err());
    }
}
