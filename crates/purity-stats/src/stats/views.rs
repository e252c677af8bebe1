use serde::{Serialize, Serializer};

use crate::survey::domain::{DemographicAnswer, DemographicField, DeviceType};

/// Aggregate for one stored demographic value. Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    #[serde(rename = "category", serialize_with = "serialize_category")]
    pub value: DemographicAnswer,
    pub count: u64,
    pub avg_score: f64,
    pub median_score: f64,
}

fn serialize_category<S>(value: &DemographicAnswer, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.category_key())
}

/// Raw distribution for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDistribution {
    pub field: DemographicField,
    pub rows: Vec<DistributionRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_submissions: u64,
    pub average_score: f64,
    pub median_score: f64,
}

/// Histogram bucket covering `min..=max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub label: String,
    pub min: u8,
    pub max: u8,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionStat {
    /// One-based question number.
    pub question: usize,
    pub yes_count: u64,
    pub yes_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceShare {
    pub device_type: DeviceType,
    pub count: u64,
    pub percentage: f64,
}

/// Per-field count with its share of all submissions. Used by the missing-data and
/// participation reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCoverage {
    pub field: DemographicField,
    pub label: &'static str,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyCount {
    pub hour: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShare {
    pub label: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderScoreDistribution {
    pub gender: &'static str,
    pub total: u64,
    pub buckets: Vec<BucketShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: String,
    pub count: u64,
    pub percentage: f64,
}

/// Where results links were shared from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareStats {
    pub total_shares: u64,
    pub platforms: Vec<PlatformShare>,
}

/// One display row after consolidation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub key: String,
    pub display_name: String,
    pub count: u64,
    pub avg_score: f64,
    pub median_score: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicTable {
    pub field: DemographicField,
    pub label: &'static str,
    pub total: u64,
    pub rows: Vec<DisplayRow>,
}

/// Payload behind the public statistics page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicOverview {
    #[serde(flatten)]
    pub summary: SummaryStats,
    pub histogram: Vec<HistogramBucket>,
    pub questions: Vec<QuestionStat>,
}

/// Everything the admin statistics page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminReport {
    #[serde(flatten)]
    pub summary: SummaryStats,
    pub show_not_provided: bool,
    pub histogram: Vec<HistogramBucket>,
    pub questions: Vec<QuestionStat>,
    pub devices: Vec<DeviceShare>,
    pub missing: Vec<FieldCoverage>,
    pub participation: Vec<FieldCoverage>,
    pub submissions_over_time: Vec<HourlyCount>,
    pub gender_scores: Vec<GenderScoreDistribution>,
    pub shares: ShareStats,
    pub distributions: Vec<FieldDistribution>,
    pub tables: Vec<DemographicTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionCount {
    pub count: u64,
    pub show_stats: bool,
}
