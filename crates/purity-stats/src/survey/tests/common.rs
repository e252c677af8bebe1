use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::config::StatisticsConfig;
use crate::survey::domain::{
    Answers, DemographicAnswer, DemographicField, Demographics, DeviceType, Feedback,
    FeedbackId, Submission, SubmissionId, SubmissionRecord, QUESTION_COUNT,
};
use crate::survey::intake::{RequestContext, SubmissionPayload};
use crate::survey::repository::{
    CountDimension, ScoreGroup, StoreError, SubmissionFilter, SubmissionStore,
};
use crate::survey::{survey_router, SurveyService};

pub(crate) fn answers_with_yes(yes: usize) -> Answers {
    let values = (0..QUESTION_COUNT).map(|index| index < yes).collect::<Vec<_>>();
    Answers::try_from(values).expect("100 answers")
}

pub(crate) fn answers_json(yes: usize) -> Value {
    json!(answers_with_yes(yes).as_slice())
}

pub(crate) fn payload(yes: usize) -> SubmissionPayload {
    SubmissionPayload {
        answers: Some(answers_json(yes)),
        ..SubmissionPayload::default()
    }
}

pub(crate) fn context() -> RequestContext {
    RequestContext {
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".to_string()),
        referer: None,
        received_at: Utc
            .with_ymd_and_hms(2024, 9, 3, 14, 5, 0)
            .single()
            .expect("valid timestamp"),
    }
}

/// Stored submission with the given score and no demographic answers recorded.
pub(crate) fn scored(score: u8) -> Submission {
    Submission {
        score,
        answers: answers_with_yes(QUESTION_COUNT - usize::from(score)),
        timestamp: context().received_at,
        device_type: DeviceType::Desktop,
        referrer: "direct".to_string(),
        share_source: None,
        demographics: Demographics::default(),
    }
}

pub(crate) fn with_field(
    mut submission: Submission,
    field: DemographicField,
    value: DemographicAnswer,
) -> Submission {
    submission.demographics.set(field, value);
    submission
}

pub(crate) fn shared_from(mut submission: Submission, platform: &str) -> Submission {
    submission.share_source = Some(platform.to_string());
    submission
}

pub(crate) fn statistics_config() -> StatisticsConfig {
    StatisticsConfig {
        public_threshold: 3,
        ..StatisticsConfig::default()
    }
}

pub(crate) fn store_with(submissions: Vec<Submission>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    for submission in submissions {
        store.insert(submission).expect("insert succeeds");
    }
    store
}

pub(crate) fn build_service() -> (SurveyService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = SurveyService::new(store.clone(), statistics_config());
    (service, store)
}

pub(crate) fn survey_router_with_service(service: SurveyService<MemoryStore>) -> axum::Router {
    survey_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(crate) struct MemoryStore {
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
    feedback: Arc<Mutex<Vec<Feedback>>>,
}

impl MemoryStore {
    pub(crate) fn feedback(&self) -> Vec<Feedback> {
        self.feedback.lock().expect("store mutex poisoned").clone()
    }

    fn submissions(&self) -> Vec<Submission> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .map(|record| record.submission.clone())
            .collect()
    }
}

impl SubmissionStore for MemoryStore {
    fn insert(&self, submission: Submission) -> Result<SubmissionId, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let id = SubmissionId(format!("sub-{:06}", guard.len() + 1));
        guard.push(SubmissionRecord {
            id: id.clone(),
            submission,
        });
        Ok(id)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().expect("store mutex poisoned").len() as u64)
    }

    fn count_where(&self, filter: &SubmissionFilter) -> Result<u64, StoreError> {
        Ok(self
            .submissions()
            .iter()
            .filter(|submission| filter.matches(submission))
            .count() as u64)
    }

    fn group_scores(&self, field: DemographicField) -> Result<Vec<ScoreGroup>, StoreError> {
        Ok(ScoreGroup::collect(&self.submissions(), field))
    }

    fn scores_ascending(&self) -> Result<Vec<u8>, StoreError> {
        let mut scores = self
            .submissions()
            .iter()
            .map(|submission| submission.score)
            .collect::<Vec<_>>();
        scores.sort_unstable();
        Ok(scores)
    }

    fn count_by(&self, dimension: CountDimension) -> Result<Vec<(String, u64)>, StoreError> {
        Ok(dimension.tally(&self.submissions()))
    }

    fn insert_feedback(&self, feedback: Feedback) -> Result<FeedbackId, StoreError> {
        let mut guard = self.feedback.lock().expect("store mutex poisoned");
        guard.push(feedback);
        Ok(FeedbackId(format!("fb-{:06}", guard.len())))
    }
}

pub(crate) struct UnavailableStore;

impl UnavailableStore {
    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl SubmissionStore for UnavailableStore {
    fn insert(&self, _submission: Submission) -> Result<SubmissionId, StoreError> {
        Self::offline()
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, StoreError> {
        Self::offline()
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Self::offline()
    }

    fn count_where(&self, _filter: &SubmissionFilter) -> Result<u64, StoreError> {
        Self::offline()
    }

    fn group_scores(&self, _field: DemographicField) -> Result<Vec<ScoreGroup>, StoreError> {
        Self::offline()
    }

    fn scores_ascending(&self) -> Result<Vec<u8>, StoreError> {
        Self::offline()
    }

    fn count_by(&self, _dimension: CountDimension) -> Result<Vec<(String, u64)>, StoreError> {
        Self::offline()
    }

    fn insert_feedback(&self, _feedback: Feedback) -> Result<FeedbackId, StoreError> {
        Self::offline()
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
