use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

use crate::api::{ApiAnalysisRequest, ApiError};
use seo_forecast::config::ForecastConfig;
use seo_forecast::error::{ProjectionError, Result};
use seo_forecast::{analyze, AnalysisReport};

#[derive(Clone)]
struct AppState {
    config: Arc<ForecastConfig>,
}

pub async fn serve(args: crate::ServeArgs) -> Result<()> {
    let (config, config_path) = ForecastConfig::load(args.config)?;
    config.to_options()?;
    if let Some(path) = config_path.filter(|path| path.exists()) {
        info!("loaded config from {}", path.display());
    }

    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| ProjectionError::Config(format!("invalid bind address: {}", err)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalysisRequest>,
) -> std::result::Result<Json<AnalysisReport>, (StatusCode, Json<ApiError>)> {
    let (table, options) = request.into_parts(&state.config).map_err(error_response)?;
    let report = analyze(&table, &options).map_err(error_response)?;
    Ok(Json(report))
}

fn error_response(err: ProjectionError) -> (StatusCode, Json<ApiError>) {
    match err {
        ProjectionError::Schema { missing } => {
            let error = ProjectionError::Schema {
                missing: missing.clone(),
            }
            .to_string();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiError {
                    error,
                    missing_columns: missing,
                }),
            )
        }
        ProjectionError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(err.to_string())),
        ),
        other => (StatusCode::BAD_REQUEST, Json(ApiError::new(other.to_string()))),
    }
}
