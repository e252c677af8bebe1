use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::stats::StatisticsError;

use super::domain::SubmissionId;
use super::intake::{FeedbackPayload, RequestContext, SubmissionPayload};
use super::repository::{StoreError, SubmissionStore};
use super::service::{SurveyService, SurveyServiceError};

/// Router exposing submission intake and the statistics views.
pub fn survey_router<S>(service: Arc<SurveyService<S>>) -> Router
where
    S: SubmissionStore + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<S>))
        .route("/api/v1/submissions/:submission_id", get(fetch_handler::<S>))
        .route("/api/v1/feedback", post(feedback_handler::<S>))
        .route("/api/v1/submission-count", get(count_handler::<S>))
        .route("/api/v1/statistics", get(overview_handler::<S>))
        .route(
            "/api/v1/statistics/demographics",
            get(demographics_handler::<S>),
        )
        .route("/api/v1/statistics/shares", get(shares_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DemographicsQuery {
    show_not_provided: Option<bool>,
}

fn request_context(headers: &HeaderMap) -> RequestContext {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    RequestContext {
        user_agent: header_value(header::USER_AGENT),
        referer: header_value(header::REFERER),
        received_at: Utc::now(),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<SubmissionPayload>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let context = request_context(&headers);
    match service.submit(payload, &context) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(SurveyServiceError::Intake(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn fetch_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let id = SubmissionId(submission_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(SurveyServiceError::Store(StoreError::NotFound)) => {
            let payload = json!({
                "error": "submission not found",
                "id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn feedback_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<FeedbackPayload>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let context = request_context(&headers);
    match service.save_feedback(payload, &context) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(SurveyServiceError::Intake(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(SurveyServiceError::Store(StoreError::NotFound)) => {
            let payload = json!({
                "error": "submission not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn count_handler<S>(State(service): State<Arc<SurveyService<S>>>) -> Response
where
    S: SubmissionStore + 'static,
{
    match service.submission_count() {
        Ok(count) => (StatusCode::OK, axum::Json(count)).into_response(),
        Err(error) => statistics_unavailable(error),
    }
}

pub(crate) async fn overview_handler<S>(State(service): State<Arc<SurveyService<S>>>) -> Response
where
    S: SubmissionStore + 'static,
{
    match service.overview() {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => statistics_unavailable(error),
    }
}

pub(crate) async fn demographics_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    Query(query): Query<DemographicsQuery>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    match service.demographic_report(query.show_not_provided) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => statistics_unavailable(error),
    }
}

pub(crate) async fn shares_handler<S>(State(service): State<Arc<SurveyService<S>>>) -> Response
where
    S: SubmissionStore + 'static,
{
    match service.share_stats() {
        Ok(shares) => (StatusCode::OK, axum::Json(shares)).into_response(),
        Err(error) => statistics_unavailable(error),
    }
}

fn statistics_unavailable(error: StatisticsError) -> Response {
    tracing::error!(%error, "statistics request failed");
    let payload = json!({
        "error": "statistics unavailable",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
