//! Enrichment and grouping pipeline
//!
//! Applies uploaded search volumes to the analyzed keywords and groups the
//! result. One configured pipeline is reused for every request a processor
//! receives.

use crate::enrich::{enrich, MetadataMap};
use crate::grouping::{GroupingConfig, GroupingObserver, KeywordGrouper, Unobserved};
use crate::record::{KeywordGroup, KeywordRecord};
use crate::{Error, Result};
use kwgroup_filters::{NormalizerConfig, PhraseNormalizer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub grouping: GroupingConfig,
    /// Number of threads (None = auto-detect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
}

/// Result of one processing request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessOutput {
    /// Enriched records in their original input order
    pub results: Vec<KeywordRecord>,
    /// Groups ordered by parent search volume, highest first
    pub groups: Vec<KeywordGroup>,
}

impl ProcessOutput {
    /// Fallback when grouping failed: every record, no groups
    pub fn ungrouped(results: Vec<KeywordRecord>) -> Self {
        Self {
            results,
            groups: Vec::new(),
        }
    }

    /// Number of keywords that were grouped
    pub fn keyword_count(&self) -> usize {
        self.results.len()
    }
}

/// Configured enrichment + grouping pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    grouper: KeywordGrouper,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        // Configure rayon thread pool
        if let Some(num_threads) = config.num_threads {
            if num_threads == 0 {
                return Err(Error::InvalidConfig("num_threads must be at least 1".to_string()));
            }
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok();
        }

        let normalizer = PhraseNormalizer::new(&config.normalizer)?;
        let grouper = KeywordGrouper::new(normalizer, config.grouping.clone())?;
        debug!("Pipeline configured: {:?}", config);

        Ok(Self { config, grouper })
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn grouper(&self) -> &KeywordGrouper {
        &self.grouper
    }

    /// Enrich and group without progress reporting
    pub fn run(&self, keywords: &[KeywordRecord], meta: Option<&MetadataMap>) -> ProcessOutput {
        self.run_with(keywords, meta, &mut Unobserved)
            .unwrap_or_default()
    }

    /// Enrich and group, reporting progress to `observer`
    ///
    /// Fails only with [`Error::Cancelled`].
    pub fn run_with<O>(
        &self,
        keywords: &[KeywordRecord],
        meta: Option<&MetadataMap>,
        observer: &mut O,
    ) -> Result<ProcessOutput>
    where
        O: GroupingObserver + ?Sized,
    {
        let results = enrich(keywords, meta);
        if let Some(meta) = meta {
            info!(
                "Enriched {} keywords from {} metadata entries",
                results.len(),
                meta.len()
            );
        }

        if observer.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let groups = self.grouper.group_with(&results, observer)?;
        Ok(ProcessOutput { results, groups })
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Map irregular plurals such as teeth and mice to their singulars
    pub fn extended_irregulars(mut self, enabled: bool) -> Self {
        self.config.normalizer.extended_irregulars = enabled;
        self
    }

    pub fn extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .normalizer
            .extra_stop_words
            .extend(words.into_iter().map(Into::into));
        self
    }

    pub fn irregular(mut self, from: &str, to: &str) -> Self {
        self.config
            .normalizer
            .extra_irregulars
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn progress_interval_ms(mut self, millis: u64) -> Self {
        self.config.grouping.progress_interval_ms = millis;
        self
    }

    pub fn cancel_check_every(mut self, records: usize) -> Self {
        self.config.grouping.cancel_check_every = records;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.grouping.chunk_size = size;
        self
    }

    pub fn parallel_threshold(mut self, records: usize) -> Self {
        self.config.grouping.parallel_threshold = records;
        self
    }

    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = Some(threads);
        self
    }

    pub fn config(self) -> PipelineConfig {
        self.config
    }

    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.config)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
