//! Keyword variation grouping
//!
//! Partitions a scored keyword list into clusters of phrase variations
//! (plural/singular, possessive and stop-word differences), keeping the
//! highest-volume keyword of each cluster as its parent. Grouping can run
//! on a background worker that reports progress and honours cancellation.

pub mod enrich;
pub mod error;
pub mod grouping;
pub mod mock;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod record;
pub mod stats;
pub mod variation;

pub use enrich::{enrich, KeywordMeta, MetadataMap};
pub use error::{Error, Result};
pub use grouping::{flatten_groups, group_keywords, GroupingConfig, GroupingObserver, KeywordGrouper, Unobserved};
pub use mock::{mock_record, mock_results};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineConfig, ProcessOutput};
pub use processor::{CancelHandle, KeywordProcessor, ProcessRequest, ProcessResponse, ProcessorState};
pub use record::{clamp_score, KeywordGroup, KeywordRecord, KeywordType};
pub use stats::{AnalysisSummary, GroupingStats, TypeBreakdown};
pub use variation::{are_variations, VariationClassifier};
