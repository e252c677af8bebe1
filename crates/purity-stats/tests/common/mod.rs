#![allow(dead_code)]

use std::sync::Mutex;

use purity_stats::survey::{
    CountDimension, DemographicField, Feedback, FeedbackId, ScoreGroup, StoreError, Submission,
    SubmissionFilter, SubmissionId, SubmissionRecord, SubmissionStore,
};

/// Store backed by a plain vector, scanned on every query.
#[derive(Default)]
pub struct VecStore {
    records: Mutex<Vec<SubmissionRecord>>,
    feedback: Mutex<Vec<Feedback>>,
}

impl VecStore {
    fn snapshot(&self) -> Vec<Submission> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .map(|record| record.submission.clone())
            .collect()
    }
}

impl SubmissionStore for VecStore {
    fn insert(&self, submission: Submission) -> Result<SubmissionId, StoreError> {
        let mut records = self.records.lock().expect("store mutex poisoned");
        let id = SubmissionId(format!("sub-{:06}", records.len() + 1));
        records.push(SubmissionRecord {
            id: id.clone(),
            submission,
        });
        Ok(id)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, StoreError> {
        let records = self.records.lock().expect("store mutex poisoned");
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.snapshot().len() as u64)
    }

    fn count_where(&self, filter: &SubmissionFilter) -> Result<u64, StoreError> {
        Ok(self.snapshot().iter().filter(|s| filter.matches(s)).count() as u64)
    }

    fn group_scores(&self, field: DemographicField) -> Result<Vec<ScoreGroup>, StoreError> {
        Ok(ScoreGroup::collect(&self.snapshot(), field))
    }

    fn scores_ascending(&self) -> Result<Vec<u8>, StoreError> {
        let mut scores = self.snapshot().iter().map(|s| s.score).collect::<Vec<_>>();
        scores.sort_unstable();
        Ok(scores)
    }

    fn count_by(&self, dimension: CountDimension) -> Result<Vec<(String, u64)>, StoreError> {
        Ok(dimension.tally(&self.snapshot()))
    }

    fn insert_feedback(&self, feedback: Feedback) -> Result<FeedbackId, StoreError> {
        let mut entries = self.feedback.lock().expect("store mutex poisoned");
        entries.push(feedback);
        Ok(FeedbackId(format!("fb-{:06}", entries.len())))
    }
}

pub fn answer_string(yes: usize) -> String {
    (0..100).map(|i| if i < yes { '1' } else { '0' }).collect()
}
