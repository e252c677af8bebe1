use crate::config::StatisticsConfig;
use crate::survey::domain::{DemographicField, DeviceType, QUESTION_COUNT};
use crate::survey::repository::{CountDimension, SubmissionFilter, SubmissionStore};

use super::consolidate::demographic_table;
use super::math::{mean, median, median_sorted, percentage, percentage2};
use super::views::{
    AdminReport, BucketShare, DeviceShare, DistributionRow, FieldCoverage, FieldDistribution,
    GenderScoreDistribution, HistogramBucket, HourlyCount, PlatformShare, PublicOverview,
    QuestionStat, ShareStats, SummaryStats,
};
use super::StatisticsError;

const MAX_SCORE: u8 = 100;
const SCORED_GENDERS: [&str; 3] = ["male", "female", "non-binary"];

/// Raw per-value rows for one field, most common first. Ties keep store encounter order.
pub fn field_distribution<S>(
    store: &S,
    field: DemographicField,
) -> Result<Vec<DistributionRow>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let mut rows = store
        .group_scores(field)?
        .into_iter()
        .map(|group| DistributionRow {
            avg_score: mean(&group.scores),
            median_score: median(&group.scores),
            value: group.value,
            count: group.count,
        })
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(rows)
}

pub fn summary<S>(store: &S) -> Result<SummaryStats, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let scores = store.scores_ascending()?;
    Ok(SummaryStats {
        total_submissions: scores.len() as u64,
        average_score: mean(&scores),
        median_score: median_sorted(&scores),
    })
}

/// Store-side histogram: one `ScoreBetween` count per bucket range.
pub fn histogram<S>(store: &S, bucket_width: u8) -> Result<Vec<HistogramBucket>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let total = store.count_all()?;
    bucket_ranges(bucket_width)
        .into_iter()
        .map(|(min, max)| {
            let count = store.count_where(&SubmissionFilter::ScoreBetween { min, max })?;
            Ok(histogram_bucket(min, max, count, total))
        })
        .collect()
}

/// Bucket scores already in memory, using the same ranges as [`histogram`].
pub fn histogram_from_scores(scores: &[u8], bucket_width: u8) -> Vec<HistogramBucket> {
    let total = scores.len() as u64;
    bucket_ranges(bucket_width)
        .into_iter()
        .map(|(min, max)| {
            let count = scores
                .iter()
                .filter(|score| (min..=max).contains(*score))
                .count() as u64;
            histogram_bucket(min, max, count, total)
        })
        .collect()
}

/// `ceil(100 / width)` inclusive ranges. The last range always ends at 100.
fn bucket_ranges(bucket_width: u8) -> Vec<(u8, u8)> {
    let width = bucket_width.clamp(1, MAX_SCORE);
    let bucket_count = MAX_SCORE.div_ceil(width);

    (0..bucket_count)
        .map(|index| {
            let min = index * width;
            let max = if index + 1 == bucket_count {
                MAX_SCORE
            } else {
                min + width - 1
            };
            (min, max)
        })
        .collect()
}

fn histogram_bucket(min: u8, max: u8, count: u64, total: u64) -> HistogramBucket {
    HistogramBucket {
        label: format!("{min}-{max}"),
        min,
        max,
        count,
        percentage: percentage2(count, total),
    }
}

/// Yes count and rounded yes percentage for every question, in question order.
pub fn question_stats<S>(store: &S) -> Result<Vec<QuestionStat>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let total = store.count_all()?;
    (0..QUESTION_COUNT)
        .map(|index| {
            let yes_count = store.count_where(&SubmissionFilter::AnsweredYes(index))?;
            Ok(QuestionStat {
                question: index + 1,
                yes_count,
                yes_percentage: percentage(yes_count, total),
            })
        })
        .collect()
}

/// Questions ordered by yes percentage, highest first. Ties keep question order.
pub fn ranked_questions(mut stats: Vec<QuestionStat>) -> Vec<QuestionStat> {
    stats.sort_by(|a, b| b.yes_percentage.cmp(&a.yes_percentage));
    stats
}

pub fn device_distribution<S>(store: &S) -> Result<Vec<DeviceShare>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let counts = store.count_by(CountDimension::DeviceType)?;
    let total: u64 = counts.iter().map(|(_, count)| count).sum();

    Ok(DeviceType::ordered()
        .into_iter()
        .map(|device_type| {
            let count = counts
                .iter()
                .find(|(key, _)| key == device_type.as_str())
                .map_or(0, |(_, count)| *count);
            DeviceShare {
                device_type,
                count,
                percentage: percentage2(count, total),
            }
        })
        .collect())
}

/// Records created before each field existed.
pub fn missing_counts<S>(store: &S) -> Result<Vec<FieldCoverage>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    coverage(store, SubmissionFilter::LegacyField)
}

/// Records where the respondent saw each field, answered or explicitly skipped.
pub fn participation<S>(store: &S) -> Result<Vec<FieldCoverage>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    coverage(store, SubmissionFilter::RecordedField)
}

fn coverage<S>(
    store: &S,
    filter: fn(DemographicField) -> SubmissionFilter,
) -> Result<Vec<FieldCoverage>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let total = store.count_all()?;
    DemographicField::ordered()
        .into_iter()
        .map(|field| {
            let count = store.count_where(&filter(field))?;
            Ok(FieldCoverage {
                field,
                label: field.label(),
                count,
                percentage: percentage2(count, total),
            })
        })
        .collect()
}

pub fn submissions_over_time<S>(store: &S) -> Result<Vec<HourlyCount>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    Ok(store
        .count_by(CountDimension::SubmittedHour)?
        .into_iter()
        .map(|(hour, count)| HourlyCount { hour, count })
        .collect())
}

/// Shares by platform, most common first. Submissions without a share source are not counted.
pub fn share_stats<S>(store: &S) -> Result<ShareStats, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let counts = store.count_by(CountDimension::ShareSource)?;
    let total_shares: u64 = counts.iter().map(|(_, count)| count).sum();

    let mut platforms = counts
        .into_iter()
        .map(|(platform, count)| PlatformShare {
            platform,
            count,
            percentage: percentage2(count, total_shares),
        })
        .collect::<Vec<_>>();
    platforms.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(ShareStats {
        total_shares,
        platforms,
    })
}

/// Share of each gender's submissions per score bucket.
pub fn gender_score_distribution<S>(
    store: &S,
    bucket_width: u8,
) -> Result<Vec<GenderScoreDistribution>, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let groups = store.group_scores(DemographicField::Gender)?;

    Ok(SCORED_GENDERS
        .into_iter()
        .map(|gender| {
            let scores = groups
                .iter()
                .filter(|group| {
                    group
                        .value
                        .as_provided()
                        .is_some_and(|value| value.trim().eq_ignore_ascii_case(gender))
                })
                .flat_map(|group| group.scores.iter().copied())
                .collect::<Vec<_>>();

            let buckets = histogram_from_scores(&scores, bucket_width)
                .into_iter()
                .map(|bucket| BucketShare {
                    label: bucket.label,
                    percentage: bucket.percentage,
                })
                .collect();

            GenderScoreDistribution {
                gender,
                total: scores.len() as u64,
                buckets,
            }
        })
        .collect())
}

pub fn public_overview<S>(
    store: &S,
    config: &StatisticsConfig,
) -> Result<PublicOverview, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    Ok(PublicOverview {
        summary: summary(store)?,
        histogram: histogram(store, config.histogram_bucket_width)?,
        questions: question_stats(store)?,
    })
}

/// Full admin view: every report plus raw and consolidated demographic tables.
pub fn admin_report<S>(
    store: &S,
    config: &StatisticsConfig,
    show_not_provided: bool,
) -> Result<AdminReport, StatisticsError>
where
    S: SubmissionStore + ?Sized,
{
    let mut distributions = Vec::with_capacity(DemographicField::ordered().len());
    let mut tables = Vec::with_capacity(DemographicField::ordered().len());
    for field in DemographicField::ordered() {
        let rows = field_distribution(store, field)?;
        tables.push(demographic_table(field, &rows, show_not_provided));
        distributions.push(FieldDistribution { field, rows });
    }

    Ok(AdminReport {
        summary: summary(store)?,
        show_not_provided,
        histogram: histogram(store, config.histogram_bucket_width)?,
        questions: ranked_questions(question_stats(store)?),
        devices: device_distribution(store)?,
        missing: missing_counts(store)?,
        participation: participation(store)?,
        submissions_over_time: submissions_over_time(store)?,
        gender_scores: gender_score_distribution(store, config.gender_bucket_width)?,
        shares: share_stats(store)?,
        distributions,
        tables,
    })
}
