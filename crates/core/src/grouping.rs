//! Near-linear keyword grouping
//!
//! Keywords are visited once in descending search-volume order and bucketed
//! by canonical key, so the first keyword seen for a key becomes the
//! parent of its group. Sorting dominates: O(n log n) overall.

use crate::progress::{percent, ProgressGate};
use crate::record::{KeywordGroup, KeywordRecord};
use crate::variation::VariationClassifier;
use crate::{Error, Result};
use ahash::AHashMap;
use kwgroup_filters::PhraseNormalizer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::time::Duration;
use tracing::{debug, info};

/// Grouping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Minimum time between progress events
    pub progress_interval_ms: u64,
    /// Records processed between cancellation checks
    pub cancel_check_every: usize,
    /// Inputs at least this large compute canonical keys in parallel
    pub parallel_threshold: usize,
    /// Records per parallel normalization chunk
    pub chunk_size: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 100,
            cancel_check_every: 250,
            parallel_threshold: 50_000,
            chunk_size: 10_000,
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cancel_check_every == 0 {
            return Err(Error::InvalidConfig(
                "cancel_check_every must be at least 1".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Receives progress and answers cancellation checks during a grouping run
pub trait GroupingObserver {
    fn on_progress(&mut self, progress: u8, message: &str) {
        let _ = (progress, message);
    }

    fn is_cancelled(&mut self) -> bool {
        false
    }
}

/// Observer that ignores progress and never cancels
pub struct Unobserved;

impl GroupingObserver for Unobserved {}

/// Groups keyword records into parent/variation clusters
#[derive(Debug, Clone, Default)]
pub struct KeywordGrouper {
    classifier: VariationClassifier,
    config: GroupingConfig,
}

impl KeywordGrouper {
    pub fn new(normalizer: PhraseNormalizer, config: GroupingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: VariationClassifier::new(normalizer),
            config,
        })
    }

    pub fn classifier(&self) -> &VariationClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Group records without progress reporting
    pub fn group(&self, records: &[KeywordRecord]) -> Vec<KeywordGroup> {
        // Unobserved never cancels, so this can't come back as an error
        self.group_with(records, &mut Unobserved).unwrap_or_default()
    }

    /// Group records, reporting progress and checking for cancellation
    ///
    /// Every input record ends up in exactly one group. Records whose key is
    /// empty (blank or all stop words) each get a singleton group.
    /// Returns [`Error::Cancelled`] as soon as the observer asks to stop; no
    /// partial groups escape.
    pub fn group_with<O>(&self, records: &[KeywordRecord], observer: &mut O) -> Result<Vec<KeywordGroup>>
    where
        O: GroupingObserver + ?Sized,
    {
        let total = records.len();
        let mut gate = ProgressGate::new(self.config.progress_interval());
        info!("Grouping {} keywords", total);

        // Stable sort: equal volumes keep their input order
        let mut order: Vec<usize> = (0..total).collect();
        order.sort_by(|&a, &b| records[b].ranking_volume().cmp(&records[a].ranking_volume()));

        if observer.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let precomputed = if total >= self.config.parallel_threshold {
            Some(self.compute_keys_parallel(records, observer, &mut gate)?)
        } else {
            None
        };
        let (base, span) = if precomputed.is_some() { (50, 50) } else { (0, 100) };

        let mut cache = self.classifier.normalizer().cache();
        let mut by_key: AHashMap<String, usize> = AHashMap::new();
        let mut groups: Vec<KeywordGroup> = Vec::new();

        for (processed, &idx) in order.iter().enumerate() {
            if processed % self.config.cancel_check_every == 0 && observer.is_cancelled() {
                debug!("Grouping cancelled after {} of {} keywords", processed, total);
                return Err(Error::Cancelled);
            }

            let record = &records[idx];
            let key = match &precomputed {
                Some(keys) => keys[idx].clone(),
                None => cache.normalize(&record.keyword).to_string(),
            };

            if !VariationClassifier::is_comparable(&key) {
                groups.push(KeywordGroup::new(record.clone(), key));
            } else {
                match by_key.entry(key) {
                    Entry::Occupied(entry) => groups[*entry.get()].push_variation(record.clone()),
                    Entry::Vacant(entry) => {
                        let lemma = entry.key().clone();
                        entry.insert(groups.len());
                        groups.push(KeywordGroup::new(record.clone(), lemma));
                    }
                }
            }

            let done = processed + 1;
            if let Some(progress) = gate.poll(base + (percent(done, total) as usize * span / 100) as u8) {
                observer.on_progress(progress, &format!("Grouping keywords... ({}/{})", done, total));
            }
        }

        if observer.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Parents were discovered in volume order already; the stable sort
        // only pins that ordering down.
        groups.sort_by(|a, b| b.parent().ranking_volume().cmp(&a.parent().ranking_volume()));

        info!(
            "Grouped {} keywords into {} groups ({} cached keys, {} cache hits)",
            total,
            groups.len(),
            cache.len(),
            cache.hits()
        );
        Ok(groups)
    }

    /// Canonical key for every record, in input order
    ///
    /// Chunks are normalized in parallel, each with its own cache.
    /// Cancellation is checked between batches of chunks.
    fn compute_keys_parallel<O>(
        &self,
        records: &[KeywordRecord],
        observer: &mut O,
        gate: &mut ProgressGate,
    ) -> Result<Vec<String>>
    where
        O: GroupingObserver + ?Sized,
    {
        let total = records.len();
        let chunk_size = self.config.chunk_size;
        let batch_size = chunk_size * rayon::current_num_threads().max(1);
        debug!(
            "Normalizing {} keywords in parallel (chunk size {}, batch size {})",
            total, chunk_size, batch_size
        );

        let mut keys = Vec::with_capacity(total);
        for batch in records.chunks(batch_size) {
            if observer.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let chunk_keys: Vec<Vec<String>> = batch
                .par_chunks(chunk_size)
                .map(|chunk| {
                    let mut cache = self.classifier.normalizer().cache();
                    chunk
                        .iter()
                        .map(|record| cache.normalize(&record.keyword).to_string())
                        .collect()
                })
                .collect();
            for chunk in chunk_keys {
                keys.extend(chunk);
            }

            if let Some(progress) = gate.poll(percent(keys.len(), total) / 2) {
                observer.on_progress(
                    progress,
                    &format!("Normalizing keywords... ({}/{})", keys.len(), total),
                );
            }
        }
        Ok(keys)
    }
}

/// Group records with the default normalizer and configuration
pub fn group_keywords(records: &[KeywordRecord]) -> Vec<KeywordGroup> {
    KeywordGrouper::default().group(records)
}

/// Parents followed by their variations, in group order
pub fn flatten_groups(groups: &[KeywordGroup]) -> Vec<KeywordRecord> {
    groups
        .iter()
        .flat_map(|group| group.members().cloned())
        .collect()
}
