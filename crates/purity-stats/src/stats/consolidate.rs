//! Reshape raw distribution rows into display rows.
//!
//! Rows are only ever recombined by count-weighted averaging; nothing here rescans the store.
//! Merged medians are the weighted mean of the member medians, an approximation of the true
//! median of the combined group.

use crate::survey::domain::{DemographicAnswer, DemographicField, LEGACY_LABEL};

use super::math::{percentage2, round2};
use super::views::{DemographicTable, DisplayRow, DistributionRow};

const PREFER_NOT_TO_SAY: &str = "prefer_not_to_say";
const OTHER_KEY: &str = "Other";

const KNOWN_SCHOOLS: &[&str] = &[
    "cas",
    "tisch",
    "stern",
    "tandon",
    "gallatin",
    "sps",
    "steinhardt",
    "wagner",
    "silver",
    "law",
    "courant",
];

const KNOWN_RACES: &[&str] = &[
    "asian",
    "white",
    "black",
    "hispanic",
    "native",
    "pacific_islander",
    "middle_eastern",
    "multiracial",
];

const RACE_MERGERS: &[SpecialMerger] = &[SpecialMerger {
    needle: "middle eastern",
    target: "middle_eastern",
}];

/// Where records predating a field end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyPlacement {
    /// Always folded into the prefer-not-to-say row.
    MergeWithDeclined,
    /// Own "Not Provided" row when shown; folded into the prefer-not-to-say row when hidden.
    SeparateWhenShown,
}

/// Free-text values containing `needle` (case-insensitive) merge into `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialMerger {
    pub needle: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolidationPolicy {
    /// Values kept as individual rows; `None` keeps every value and disables "Other".
    pub known_values: Option<&'static [&'static str]>,
    pub special_mergers: &'static [SpecialMerger],
    pub declined_key: &'static str,
    pub legacy: LegacyPlacement,
}

impl ConsolidationPolicy {
    pub fn for_field(field: DemographicField) -> Self {
        match field {
            DemographicField::Gender | DemographicField::Relationship => Self {
                known_values: None,
                special_mergers: &[],
                declined_key: "prefer_not_to_say_combined",
                legacy: LegacyPlacement::MergeWithDeclined,
            },
            DemographicField::Race => Self {
                known_values: Some(KNOWN_RACES),
                special_mergers: RACE_MERGERS,
                declined_key: "prefer_not_to_say_combined",
                legacy: LegacyPlacement::MergeWithDeclined,
            },
            DemographicField::School => Self {
                known_values: Some(KNOWN_SCHOOLS),
                special_mergers: &[],
                declined_key: "prefer_not_to_say_school",
                legacy: LegacyPlacement::SeparateWhenShown,
            },
            DemographicField::Year => Self {
                known_values: None,
                special_mergers: &[],
                declined_key: "prefer_not_to_say_year",
                legacy: LegacyPlacement::SeparateWhenShown,
            },
            DemographicField::Living => Self {
                known_values: None,
                special_mergers: &[],
                declined_key: "prefer_not_to_say_living",
                legacy: LegacyPlacement::SeparateWhenShown,
            },
        }
    }

    fn bucket_for(&self, value: &DemographicAnswer, show_not_provided: bool) -> BucketKey {
        let provided = match value {
            DemographicAnswer::LegacyUnknown => {
                return match (self.legacy, show_not_provided) {
                    (LegacyPlacement::SeparateWhenShown, true) => BucketKey::Legacy,
                    _ => BucketKey::PreferNotToSay(self.declined_key),
                };
            }
            DemographicAnswer::DeclinedToAnswer => {
                return BucketKey::PreferNotToSay(self.declined_key);
            }
            DemographicAnswer::Provided(value) => value.trim().to_lowercase(),
        };

        if provided == PREFER_NOT_TO_SAY || provided == self.declined_key {
            return BucketKey::PreferNotToSay(self.declined_key);
        }

        if let Some(merger) = self
            .special_mergers
            .iter()
            .find(|merger| provided.contains(merger.needle))
        {
            return BucketKey::Value(merger.target.to_string());
        }

        match self.known_values {
            Some(known) if !known.contains(&provided.as_str()) => BucketKey::Other,
            _ => BucketKey::Value(provided),
        }
    }
}

/// Display bucket a raw row lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketKey {
    Value(String),
    Other,
    PreferNotToSay(&'static str),
    Legacy,
}

impl BucketKey {
    pub fn key(&self) -> &str {
        match self {
            Self::Value(value) => value,
            Self::Other => OTHER_KEY,
            Self::PreferNotToSay(key) => key,
            Self::Legacy => LEGACY_LABEL,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Value(value) if value == "middle_eastern" => "Middle Eastern".to_string(),
            Self::Value(value) => capitalize(value),
            Self::Other => OTHER_KEY.to_string(),
            Self::PreferNotToSay(_) => "Prefer not to say".to_string(),
            Self::Legacy => LEGACY_LABEL.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Value(_) => 0,
            Self::Other => 1,
            Self::PreferNotToSay(_) => 2,
            Self::Legacy => 3,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct Accumulator {
    bucket: BucketKey,
    count: u64,
    weighted_avg: f64,
    weighted_median: f64,
}

/// Merge `rows` under `policy`. Individual values come first by count, then "Other", then
/// the prefer-not-to-say row, then the raw legacy row.
pub fn consolidate(
    rows: &[DistributionRow],
    policy: &ConsolidationPolicy,
    show_not_provided: bool,
) -> Vec<DisplayRow> {
    let mut buckets: Vec<Accumulator> = Vec::new();

    for row in rows {
        let bucket = policy.bucket_for(&row.value, show_not_provided);
        let weight = row.count as f64;
        match buckets.iter_mut().find(|acc| acc.bucket == bucket) {
            Some(acc) => {
                acc.count += row.count;
                acc.weighted_avg += row.avg_score * weight;
                acc.weighted_median += row.median_score * weight;
            }
            None => buckets.push(Accumulator {
                bucket,
                count: row.count,
                weighted_avg: row.avg_score * weight,
                weighted_median: row.median_score * weight,
            }),
        }
    }

    buckets.sort_by(|a, b| {
        a.bucket
            .rank()
            .cmp(&b.bucket.rank())
            .then_with(|| match (&a.bucket, &b.bucket) {
                (BucketKey::Value(_), BucketKey::Value(_)) => b.count.cmp(&a.count),
                _ => std::cmp::Ordering::Equal,
            })
    });

    let total: u64 = buckets.iter().map(|acc| acc.count).sum();
    buckets
        .into_iter()
        .map(|acc| {
            let (avg_score, median_score) = if acc.count == 0 {
                (0.0, 0.0)
            } else {
                let count = acc.count as f64;
                (
                    round2(acc.weighted_avg / count),
                    round2(acc.weighted_median / count),
                )
            };
            DisplayRow {
                key: acc.bucket.key().to_string(),
                display_name: acc.bucket.display_name(),
                count: acc.count,
                avg_score,
                median_score,
                percentage: percentage2(acc.count, total),
            }
        })
        .collect()
}

/// Consolidated table for `field` using its standard policy.
pub fn demographic_table(
    field: DemographicField,
    rows: &[DistributionRow],
    show_not_provided: bool,
) -> DemographicTable {
    let rows = consolidate(rows, &ConsolidationPolicy::for_field(field), show_not_provided);
    DemographicTable {
        field,
        label: field.label(),
        total: rows.iter().map(|row| row.count).sum(),
        rows,
    }
}
