use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ehp_core::{
    Dataset, EhpView, Generator, GeneratorInfo, InferredDiagram, ViewParameters, ass_view,
    ehp_view, infer_differentials, inspect_generator,
};
use ehp_store::{ViewConfig, ViewOverrides};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::report::{ProjectionReport, projection_report};

/// Datasets are loaded once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    datasets: Arc<BTreeMap<String, Dataset>>,
    view: Arc<ViewConfig>,
}

impl AppState {
    pub fn new(datasets: impl IntoIterator<Item = (String, Dataset)>, view: ViewConfig) -> Self {
        Self {
            datasets: Arc::new(datasets.into_iter().collect()),
            view: Arc::new(view),
        }
    }

    fn dataset(&self, name: &str) -> Result<&Dataset, ApiError> {
        self.datasets
            .get(name)
            .ok_or_else(|| ApiError::UnknownDataset(name.to_string()))
    }
}

#[derive(Debug)]
pub enum ApiError {
    UnknownDataset(String),
    UnknownGenerator { dataset: String, name: String },
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::UnknownDataset(name) => {
                (StatusCode::NOT_FOUND, format!("dataset '{name}' not found"))
            }
            Self::UnknownGenerator { dataset, name } => (
                StatusCode::NOT_FOUND,
                format!("generator '{name}' not found in dataset '{dataset}'"),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/datasets", get(list_datasets))
        .route("/datasets/{name}/project", get(project))
        .route("/datasets/{name}/infer", get(infer))
        .route("/datasets/{name}/view", get(view))
        .route("/datasets/{name}/ass", get(ass))
        .route("/datasets/{name}/generators/{generator}", get(generator));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(listen: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for ctrl-c: {e}");
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

fn resolve(state: &AppState, overrides: &ViewOverrides) -> Result<ViewParameters, ApiError> {
    if let Some(page) = overrides.page
        && page < 1
    {
        return Err(ApiError::BadRequest(format!(
            "page must be at least 1, got {page}"
        )));
    }
    Ok(state.view.resolve(overrides))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    datasets: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        datasets: state.datasets.len(),
    })
}

#[derive(Debug, Serialize)]
struct DatasetEntry {
    name: String,
    generators: usize,
    differentials: usize,
}

async fn list_datasets(State(state): State<AppState>) -> Json<Vec<DatasetEntry>> {
    Json(
        state
            .datasets
            .iter()
            .map(|(name, d)| DatasetEntry {
                name: name.clone(),
                generators: d.len(),
                differentials: d.differentials().len(),
            })
            .collect(),
    )
}

async fn project(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(overrides): Query<ViewOverrides>,
) -> ApiResult<ProjectionReport> {
    let view = resolve(&state, &overrides)?;
    let dataset = state.dataset(&name)?;
    Ok(Json(projection_report(dataset, &view)))
}

async fn infer(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(overrides): Query<ViewOverrides>,
) -> ApiResult<InferredDiagram> {
    let view = resolve(&state, &overrides)?;
    let dataset = state.dataset(&name)?;
    Ok(Json(infer_differentials(dataset, view.truncation)))
}

async fn view(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(overrides): Query<ViewOverrides>,
) -> ApiResult<EhpView> {
    let view = resolve(&state, &overrides)?;
    let dataset = state.dataset(&name)?;
    Ok(Json(ehp_view(dataset, &view)))
}

async fn ass(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(overrides): Query<ViewOverrides>,
) -> ApiResult<Vec<Generator>> {
    let view = resolve(&state, &overrides)?;
    let dataset = state.dataset(&name)?;
    Ok(Json(ass_view(dataset, view.truncation)))
}

async fn generator(
    State(state): State<AppState>,
    Path((name, generator)): Path<(String, String)>,
) -> ApiResult<GeneratorInfo> {
    let dataset = state.dataset(&name)?;
    inspect_generator(dataset, &generator)
        .map(Json)
        .ok_or(ApiError::UnknownGenerator {
            dataset: name,
            name: generator,
        })
}
