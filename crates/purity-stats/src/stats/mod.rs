//! Aggregation and bucketing over stored submissions.

pub mod aggregator;
pub mod consolidate;
pub mod math;
pub mod views;


use crate::survey::repository::StoreError;

pub use aggregator::{
    admin_report, device_distribution, field_distribution, gender_score_distribution, histogram,
    histogram_from_scores, missing_counts, participation, public_overview, question_stats,
    ranked_questions, share_stats, submissions_over_time, summary,
};
pub use consolidate::{
    consolidate, demographic_table, BucketKey, ConsolidationPolicy, LegacyPlacement, SpecialMerger,
};
pub use views::{
    AdminReport, BucketShare, DemographicTable, DeviceShare, DisplayRow, DistributionRow,
    FieldCoverage, FieldDistribution, GenderScoreDistribution, HistogramBucket, HourlyCount,
    PlatformShare, PublicOverview, QuestionStat, ShareStats, SubmissionCount, SummaryStats,
};

/// Raised when a statistics computation cannot complete. There is no partial result.
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
