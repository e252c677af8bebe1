use serde::Serialize;

use super::domain::{
    DemographicAnswer, DemographicField, Feedback, FeedbackId, Submission, SubmissionId,
    SubmissionRecord,
};

/// Read/insert operations the statistics core needs from the document store.
///
/// Implementations live with the persistence engine; the core only ever scans.
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission and return the identifier the store assigned.
    fn insert(&self, submission: Submission) -> Result<SubmissionId, StoreError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, StoreError>;
    fn count_all(&self) -> Result<u64, StoreError>;
    fn count_where(&self, filter: &SubmissionFilter) -> Result<u64, StoreError>;
    /// Group by a demographic field, legacy shapes collapsed, in first-encounter order.
    fn group_scores(&self, field: DemographicField) -> Result<Vec<ScoreGroup>, StoreError>;
    /// Every stored score, ascending.
    fn scores_ascending(&self) -> Result<Vec<u8>, StoreError>;
    /// Counts keyed by a dimension value, ascending by key. Records without a value are skipped.
    fn count_by(&self, dimension: CountDimension) -> Result<Vec<(String, u64)>, StoreError>;
    /// Persist feedback for an existing submission.
    fn insert_feedback(&self, feedback: Feedback) -> Result<FeedbackId, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("submission not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Predicates accepted by [`SubmissionStore::count_where`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFilter {
    /// Answer at this zero-based question index is "yes".
    AnsweredYes(usize),
    /// Field is absent, null, or empty on the stored document.
    LegacyField(DemographicField),
    /// Field holds any value written by a client that knew about it, opt-outs included.
    RecordedField(DemographicField),
    /// Score within `min..=max`.
    ScoreBetween { min: u8, max: u8 },
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        match *self {
            Self::AnsweredYes(question) => submission.answers.is_yes(question),
            Self::LegacyField(field) => submission.demographic(field).is_legacy(),
            Self::RecordedField(field) => !submission.demographic(field).is_legacy(),
            Self::ScoreBetween { min, max } => (min..=max).contains(&submission.score),
        }
    }
}

/// Dimensions accepted by [`SubmissionStore::count_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDimension {
    DeviceType,
    SubmittedHour,
    /// Platform the results link was shared from, when one was recorded.
    ShareSource,
}

impl CountDimension {
    pub fn key_for(&self, submission: &Submission) -> Option<String> {
        match self {
            Self::DeviceType => Some(submission.device_type.as_str().to_string()),
            Self::SubmittedHour => Some(submission.submitted_hour()),
            Self::ShareSource => submission.share_source.clone(),
        }
    }

    /// Tally keys over a scan, sorted by key.
    pub fn tally<'a, I>(&self, submissions: I) -> Vec<(String, u64)>
    where
        I: IntoIterator<Item = &'a Submission>,
    {
        let mut counts = std::collections::BTreeMap::<String, u64>::new();
        for key in submissions.into_iter().filter_map(|submission| self.key_for(submission)) {
            *counts.entry(key).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

/// One group from [`SubmissionStore::group_scores`], with the member scores for medians.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreGroup {
    pub value: DemographicAnswer,
    pub count: u64,
    pub scores: Vec<u8>,
}

impl ScoreGroup {
    /// Group a scan by `field`, preserving first-encounter order.
    pub fn collect<'a, I>(submissions: I, field: DemographicField) -> Vec<ScoreGroup>
    where
        I: IntoIterator<Item = &'a Submission>,
    {
        let mut groups: Vec<ScoreGroup> = Vec::new();
        for submission in submissions {
            let value = submission.demographic(field);
            match groups.iter_mut().find(|group| &group.value == value) {
                Some(group) => {
                    group.count += 1;
                    group.scores.push(submission.score);
                }
                None => groups.push(ScoreGroup {
                    value: value.clone(),
                    count: 1,
                    scores: vec![submission.score],
                }),
            }
        }
        groups
    }
}
