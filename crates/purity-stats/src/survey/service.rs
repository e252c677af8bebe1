use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StatisticsConfig;
use crate::stats::{
    self, AdminReport, PublicOverview, ShareStats, StatisticsError, SubmissionCount,
};

use super::domain::{DeviceType, Feedback, FeedbackId, Submission, SubmissionId, SubmissionRecord};
use super::intake::{
    FeedbackPayload, IntakeGuard, IntakeViolation, RequestContext, SubmissionPayload,
};
use super::repository::{StoreError, SubmissionStore};

/// Service composing the intake guard, the submission store, and the statistics views.
pub struct SurveyService<S> {
    guard: IntakeGuard,
    store: Arc<S>,
    config: StatisticsConfig,
}

/// Returned to the client after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackReceipt {
    pub id: FeedbackId,
    pub submission_id: SubmissionId,
}

impl<S> SurveyService<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>, config: StatisticsConfig) -> Self {
        Self::with_guard(IntakeGuard::default(), store, config)
    }

    pub fn with_guard(guard: IntakeGuard, store: Arc<S>, config: StatisticsConfig) -> Self {
        Self {
            guard,
            store,
            config,
        }
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    /// Validate, score, and store a submission.
    pub fn submit(
        &self,
        payload: SubmissionPayload,
        context: &RequestContext,
    ) -> Result<SubmissionReceipt, SurveyServiceError> {
        let submission = self
            .guard
            .submission_from_payload(payload, context)
            .inspect_err(|violation| debug!(%violation, "rejected submission"))?;
        let score = submission.score;

        let id = self.store.insert(submission)?;
        info!(submission_id = %id, score, "stored submission");
        Ok(SubmissionReceipt { id, score })
    }

    pub fn get(&self, id: &SubmissionId) -> Result<SubmissionRecord, SurveyServiceError> {
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Attach feedback to a stored submission. The score is taken from the stored record.
    pub fn save_feedback(
        &self,
        payload: FeedbackPayload,
        context: &RequestContext,
    ) -> Result<FeedbackReceipt, SurveyServiceError> {
        let draft = self
            .guard
            .feedback_from_payload(payload)
            .inspect_err(|violation| debug!(%violation, "rejected feedback"))?;
        let record = self.get(&draft.submission_id)?;
        let user_agent = context.user_agent.as_deref().unwrap_or_default();

        let feedback = Feedback {
            submission_id: record.id,
            text: draft.text,
            email: draft.email,
            score: record.submission.score,
            device_type: DeviceType::from_user_agent(user_agent),
            created_at: context.received_at,
        };
        let submission_id = feedback.submission_id.clone();
        let score = feedback.score;
        let has_email = feedback.email.is_some();

        let id = self.store.insert_feedback(feedback)?;
        info!(feedback_id = %id, %submission_id, score, has_email, "stored feedback");
        Ok(FeedbackReceipt { id, submission_id })
    }

    /// Store pre-scored submissions, e.g. from a CSV export. Returns how many were stored.
    pub fn import(&self, submissions: Vec<Submission>) -> Result<usize, SurveyServiceError> {
        let mut stored = 0;
        for submission in submissions {
            self.store.insert(submission)?;
            stored += 1;
        }
        info!(stored, "imported submissions");
        Ok(stored)
    }

    /// Total submissions and whether public statistics are unlocked.
    pub fn submission_count(&self) -> Result<SubmissionCount, StatisticsError> {
        let count = self.store.count_all()?;
        Ok(SubmissionCount {
            count,
            show_stats: count >= self.config.public_threshold
                || self.config.reveal_before_threshold,
        })
    }

    pub fn overview(&self) -> Result<PublicOverview, StatisticsError> {
        stats::public_overview(self.store.as_ref(), &self.config)
            .inspect_err(|error| warn!(%error, "public statistics failed"))
    }

    pub fn share_stats(&self) -> Result<ShareStats, StatisticsError> {
        stats::share_stats(self.store.as_ref())
            .inspect_err(|error| warn!(%error, "share statistics failed"))
    }

    /// Admin report. `None` falls back to the configured toggle.
    pub fn demographic_report(
        &self,
        show_not_provided: Option<bool>,
    ) -> Result<AdminReport, StatisticsError> {
        let show = show_not_provided.unwrap_or(self.config.show_not_provided);
        stats::admin_report(self.store.as_ref(), &self.config, show)
            .inspect_err(|error| warn!(%error, "demographic report failed"))
    }
}

/// Error raised by the survey service on the write and lookup paths.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}
