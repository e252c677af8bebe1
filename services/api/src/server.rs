use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionStore};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use purity_stats::config::AppConfig;
use purity_stats::error::AppError;
use purity_stats::survey::{SubmissionImporter, SurveyService};
use purity_stats::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemorySubmissionStore::default());
    let survey_service = Arc::new(SurveyService::new(store, config.statistics.clone()));

    if let Some(path) = args.seed_csv.take() {
        let submissions = SubmissionImporter::from_path(&path)?;
        let seeded = survey_service.import(submissions)?;
        info!(seeded, path = %path.display(), "seeded submissions from export");
    }

    let app = with_survey_routes(survey_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "purity survey service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
