//! Summary statistics for grouping runs and analysis results

use crate::record::{KeywordGroup, KeywordRecord, KeywordType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Grouping statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingStats {
    pub total_groups: usize,
    pub total_keywords: usize,
    pub groups_with_variations: usize,
    /// Rounded to one decimal place
    pub average_variations_per_group: f64,
}

impl GroupingStats {
    pub fn from_groups(groups: &[KeywordGroup]) -> Self {
        let total_variations: usize = groups.iter().map(|g| g.total_variations()).sum();
        let average = if groups.is_empty() {
            0.0
        } else {
            total_variations as f64 / groups.len() as f64
        };

        Self {
            total_groups: groups.len(),
            total_keywords: groups.len() + total_variations,
            groups_with_variations: groups.iter().filter(|g| g.total_variations() > 0).count(),
            average_variations_per_group: (average * 10.0).round() / 10.0,
        }
    }

    /// Percentage of keywords folded into another keyword's group
    pub fn consolidation_rate(&self) -> f64 {
        if self.total_keywords > 0 {
            ((self.total_keywords - self.total_groups) as f64 / self.total_keywords as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Keyword counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub generic: usize,
    pub our_brand: usize,
    pub competitor_brand: usize,
}

impl TypeBreakdown {
    pub fn count(&mut self, keyword_type: KeywordType) {
        match keyword_type {
            KeywordType::Generic => self.generic += 1,
            KeywordType::OurBrand => self.our_brand += 1,
            KeywordType::CompetitorBrand => self.competitor_brand += 1,
        }
    }

    pub fn get(&self, keyword_type: KeywordType) -> usize {
        match keyword_type {
            KeywordType::Generic => self.generic,
            KeywordType::OurBrand => self.our_brand,
            KeywordType::CompetitorBrand => self.competitor_brand,
        }
    }
}

/// Summary of a batch of analyzed keywords
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_keywords: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub by_type: TypeBreakdown,
    pub average_score: f64,
    /// Seconds
    pub processing_time: f64,
}

impl AnalysisSummary {
    /// Summarize `records` out of `total_keywords` submitted keywords
    pub fn from_records(total_keywords: usize, records: &[KeywordRecord]) -> Self {
        let mut by_type = TypeBreakdown::default();
        for record in records {
            by_type.count(record.keyword_type);
        }

        let average_score = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64
        };

        Self {
            total_keywords,
            analyzed: records.len(),
            failed: total_keywords.saturating_sub(records.len()),
            by_type,
            average_score,
            processing_time: 0.0,
        }
    }

    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed.as_secs_f64();
        self
    }
}
