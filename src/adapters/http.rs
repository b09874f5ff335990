use crate::core::service::PredictionService;
use crate::core::{Classifier, ClinicalObservation};
use crate::domain::model::PredictionResponse;
use crate::utils::error::{PredictorError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const PREDICT_ROUTE: &str = "/heart-disease-predictor";
pub const HEALTH_ROUTE: &str = "/health";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
    pub features: usize,
}

/// handler 邊界的錯誤：輸入錯誤回 4xx，推論失敗回 5xx
#[derive(Debug)]
pub enum ApiError {
    Rejected(JsonRejection),
    Predictor(PredictorError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<PredictorError> for ApiError {
    fn from(err: PredictorError) -> Self {
        ApiError::Predictor(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Rejected(rejection) => {
                tracing::warn!("⚠️ Rejected request body: {}", rejection.body_text());
                (rejection.status(), rejection.body_text())
            }
            ApiError::Predictor(err) => {
                tracing::error!(
                    "❌ Prediction failed: {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub fn router<M>(service: Arc<PredictionService<M>>) -> Router
where
    M: Classifier + 'static,
{
    Router::new()
        .route(PREDICT_ROUTE, post(predict::<M>))
        .route(HEALTH_ROUTE, get(health::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn predict<M: Classifier>(
    State(service): State<Arc<PredictionService<M>>>,
    payload: std::result::Result<Json<ClinicalObservation>, JsonRejection>,
) -> std::result::Result<Json<PredictionResponse>, ApiError> {
    let Json(observation) = payload?;
    let diagnosis = service.predict(&observation)?;
    Ok(Json(diagnosis.into()))
}

async fn health<M: Classifier>(
    State(service): State<Arc<PredictionService<M>>>,
) -> Json<HealthResponse> {
    let info = service.model_info();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: info.name,
        version: info.version,
        features: info.features,
    })
}

pub async fn serve<M>(service: Arc<PredictionService<M>>, addr: SocketAddr) -> Result<()>
where
    M: Classifier + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
