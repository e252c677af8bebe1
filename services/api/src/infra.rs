use metrics_exporter_prometheus::PrometheusHandle;
use purity_stats::survey::{
    CountDimension, DemographicField, Feedback, FeedbackId, ScoreGroup, StoreError, Submission,
    SubmissionFilter, SubmissionId, SubmissionRecord, SubmissionStore,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local document store. Records are append-only; ids follow insertion order.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionStore {
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
    feedback: Arc<Mutex<Vec<Feedback>>>,
}

impl InMemorySubmissionStore {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<SubmissionRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("submission store mutex poisoned".to_string()))
    }

    fn lock_feedback(&self) -> Result<MutexGuard<'_, Vec<Feedback>>, StoreError> {
        self.feedback
            .lock()
            .map_err(|_| StoreError::Unavailable("feedback store mutex poisoned".to_string()))
    }

    fn scan<T>(
        &self,
        visit: impl FnOnce(&mut dyn Iterator<Item = &Submission>) -> T,
    ) -> Result<T, StoreError> {
        let guard = self.lock()?;
        let mut submissions = guard.iter().map(|record| &record.submission);
        Ok(visit(&mut submissions))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn insert(&self, submission: Submission) -> Result<SubmissionId, StoreError> {
        let mut guard = self.lock()?;
        let id = SubmissionId(format!("sub-{:06}", guard.len() + 1));
        guard.push(SubmissionRecord {
            id: id.clone(),
            submission,
        });
        Ok(id)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.len() as u64)
    }

    fn count_where(&self, filter: &SubmissionFilter) -> Result<u64, StoreError> {
        self.scan(|submissions| submissions.filter(|s| filter.matches(s)).count() as u64)
    }

    fn group_scores(&self, field: DemographicField) -> Result<Vec<ScoreGroup>, StoreError> {
        self.scan(|submissions| ScoreGroup::collect(submissions, field))
    }

    fn scores_ascending(&self) -> Result<Vec<u8>, StoreError> {
        let mut scores =
            self.scan(|submissions| submissions.map(|s| s.score).collect::<Vec<_>>())?;
        scores.sort_unstable();
        Ok(scores)
    }

    fn count_by(&self, dimension: CountDimension) -> Result<Vec<(String, u64)>, StoreError> {
        self.scan(|submissions| dimension.tally(submissions))
    }

    fn insert_feedback(&self, feedback: Feedback) -> Result<FeedbackId, StoreError> {
        let mut guard = self.lock_feedback()?;
        guard.push(feedback);
        Ok(FeedbackId(format!("fb-{:06}", guard.len())))
    }
}
