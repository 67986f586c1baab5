//! HTTP surface: upload page, `POST /api/analyze` and its CORS preflight.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::{ImageAnalysis, VisionReport};
use crate::config::Config;
use crate::error::ValidationError;
use crate::image_data::ImageUpload;
use crate::prompt::{render_prompt, DEFAULT_TIPS};
use crate::providers::VisionProvider;
use crate::web;

/// Settings the handlers need beyond the provider itself.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub fallback_on_error: bool,
    pub max_body_bytes: usize,
    pub environment: &'static str,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            fallback_on_error: config.fallback_on_error,
            max_body_bytes: config.max_body_bytes,
            environment: config.environment_label(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            fallback_on_error: false,
            max_body_bytes: 16 * 1024 * 1024,
            environment: "Local",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn VisionProvider>,
    settings: Arc<ServiceSettings>,
}

impl AppState {
    pub fn new(provider: Arc<dyn VisionProvider>, settings: ServiceSettings) -> Self {
        Self {
            provider,
            settings: Arc::new(settings),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: ImageAnalysis,
    pub prompt: String,
    pub tips: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Provider(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Provider(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(web::index))
        .route(
            "/api/analyze",
            post(analyze).layer(DefaultBodyLimit::max(state.settings.max_body_bytes)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let span = info_span!("analyze", request_id = %short_request_id());
    handle_analyze(state, payload).instrument(span).await
}

async fn handle_analyze(
    state: AppState,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let started = Instant::now();
    let provider = state.provider.name();
    info!(provider, environment = state.settings.environment, "request start");

    let image = match payload {
        Ok(Json(request)) => request.image,
        Err(rejection) => {
            warn!(%rejection, "unreadable request body");
            None
        }
    };
    info!(image_len = image.as_deref().map_or(0, str::len), "image received");

    let upload = ImageUpload::from_data_uri(image.as_deref()).map_err(|err| {
        warn!(error = %err, "validation failed");
        ApiError::Validation(err)
    })?;
    info!(format = upload.format().mime_type(), dimensions = ?upload.dimensions(), "validation passed");

    let report = match state.provider.analyze(&upload).await {
        Ok(report) => report,
        Err(err) if state.settings.fallback_on_error => {
            warn!(provider, error = %err, "provider failed, serving fallback analysis");
            VisionReport::fallback()
        }
        Err(err) => {
            let message = err.user_message(provider);
            error!(
                provider,
                error = %err,
                user_message = %message,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request failed"
            );
            return Err(ApiError::Provider(message));
        }
    };

    let report = report.with_dimensions(upload.dimensions());
    let prompt = render_prompt(&report);
    info!(
        kind = %report.analysis.kind,
        style = %report.analysis.style,
        prompt_chars = prompt.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request succeeded"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: report.analysis,
        prompt,
        tips: DEFAULT_TIPS.to_vec(),
    }))
}
