//! HTTP surface for the dashboard: thin handlers over the analytics engine
//! and the ingest pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, OriginalUri, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, warn};

use crate::analytics::{
    AnalyticsEngine, CategorySummary, DailySentiment, DailyVolume, Distribution,
    FilteredFeedback, PlatformSummary, RadarComparison, Ranking, TopStats,
};
use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::error::Error;
use crate::ingest::Ingestor;
use crate::store::FeedbackStore;

/// Batch imports can be large.
const BODY_LIMIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalyticsEngine>,
    pub ingestor: Arc<Ingestor>,
    pub mock_feedback_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        classifier: Classifier,
        config: &AppConfig,
    ) -> Result<Self, Error> {
        let engine = AnalyticsEngine::new(store.clone(), config.analytics.clone())?;
        Ok(Self {
            engine: Arc::new(engine),
            ingestor: Arc::new(Ingestor::new(classifier, store)),
            mock_feedback_path: Arc::new(config.mock_feedback_path.clone()),
        })
    }
}

/// Error wrapper rendering `{"error": "..."}` with a status per error kind.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            // ItemEnrichment is absorbed by the ingestor; reaching here is a bug.
            Error::ItemEnrichment { .. }
            | Error::QueryExecution { .. }
            | Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(|| async { "Backend API is running" }))
        .route("/health", get(|| async { "ok" }))
        .nest("/api/feedback", feedback_routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/import-mock", get(import_mock))
        .route("/import", post(import_batch))
        .route("/sentiment-summary", get(sentiment_summary))
        .route("/getplatformdata", get(platform_data))
        .route("/sentiment-overtime", get(sentiment_over_time))
        .route("/mention-volume", get(mention_volume))
        .route("/sentiment-ranking", get(sentiment_ranking))
        .route("/sentiment-distribution", get(sentiment_distribution))
        .route("/top-stats", get(top_stats))
        .route("/radar-comparison", get(radar_comparison))
        .route("/filterdata", get(filter_data))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Route not found: {uri}") })),
    )
}

async fn import_mock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.ingestor.import_file(&state.mock_feedback_path).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Imported and inserted {} mock feedbacks", report.inserted_count),
        })),
    ))
}

async fn import_batch(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.ingestor.import_json(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Imported and inserted {} feedbacks", report.inserted_count),
            "insertedCount": report.inserted_count,
            "dropped": report.dropped,
        })),
    ))
}

async fn sentiment_summary(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    Ok(Json(state.engine.category_sentiment_summary().await?))
}

async fn platform_data(State(state): State<AppState>) -> ApiResult<Vec<PlatformSummary>> {
    Ok(Json(state.engine.platform_sentiment_summary().await?))
}

async fn sentiment_over_time(State(state): State<AppState>) -> ApiResult<Vec<DailySentiment>> {
    Ok(Json(state.engine.sentiment_over_time().await?))
}

async fn mention_volume(State(state): State<AppState>) -> ApiResult<Vec<DailyVolume>> {
    Ok(Json(state.engine.mention_volume_over_time().await?))
}

async fn sentiment_ranking(State(state): State<AppState>) -> ApiResult<Ranking> {
    Ok(Json(state.engine.sentiment_ranking().await?))
}

async fn sentiment_distribution(State(state): State<AppState>) -> ApiResult<Distribution> {
    Ok(Json(state.engine.sentiment_distribution().await?))
}

async fn top_stats(State(state): State<AppState>) -> ApiResult<TopStats> {
    Ok(Json(state.engine.top_stats().await?))
}

async fn radar_comparison(State(state): State<AppState>) -> ApiResult<RadarComparison> {
    Ok(Json(state.engine.radar_comparison().await?))
}

#[derive(Debug, Deserialize)]
struct FilterParams {
    platform: Option<String>,
}

async fn filter_data(
    State(state): State<AppState>,
    Query(q): Query<FilterParams>,
) -> ApiResult<FilteredFeedback> {
    Ok(Json(
        state.engine.filtered_feedback(q.platform.as_deref()).await?,
    ))
}
