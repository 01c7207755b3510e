use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::generate::mode::Mode;
use crate::generate::Generator;
use crate::trends::{TrendListing, TrendService};

#[derive(Clone)]
pub struct AppState {
    pub trends: Arc<TrendService>,
    pub generator: Arc<Generator>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(trends: TrendService, generator: Generator, static_dir: PathBuf) -> Self {
        Self {
            trends: Arc::new(trends),
            generator: Arc::new(generator),
            static_dir,
        }
    }

    /// `secret_key` is the generator key from the deployment secret store, if any.
    pub fn from_config(cfg: &AppConfig, secret_key: Option<String>) -> anyhow::Result<Self> {
        let trends = TrendService::from_config(&cfg.trends)?;
        let generator = Generator::from_config(&cfg.generator, secret_key)?;
        Ok(Self::new(trends, generator, cfg.server.static_dir.clone()))
    }
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/modes", get(list_modes))
        .route("/api/trends", get(get_trends))
        .route("/api/trends/refresh", post(refresh_trends))
        .route("/api/generate", post(generate))
        .fallback_service(assets)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ModeOut {
    id: &'static str,
    label: &'static str,
}

async fn list_modes() -> Json<Vec<ModeOut>> {
    Json(
        Mode::ALL
            .iter()
            .map(|m| ModeOut {
                id: m.id(),
                label: m.label(),
            })
            .collect(),
    )
}

async fn get_trends(State(state): State<AppState>) -> Json<TrendListing> {
    Json(state.trends.listing(false).await)
}

async fn refresh_trends(State(state): State<AppState>) -> Json<TrendListing> {
    Json(state.trends.listing(true).await)
}

#[derive(serde::Deserialize)]
struct GenerateReq {
    #[serde(default)]
    term: Option<String>,
    /// Rank in the last listing; used when `term` is absent.
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    mode: Mode,
    /// Key typed into the page; wins over the configured one.
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(serde::Serialize)]
struct GenerateResp {
    term: String,
    mode: Mode,
    label: &'static str,
    output: String,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(msg: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody { error: msg.into() }),
    )
        .into_response()
}

async fn generate(State(state): State<AppState>, Json(body): Json<GenerateReq>) -> Response {
    let term = match (body.term.as_deref().map(str::trim), body.rank) {
        (Some(t), _) if !t.is_empty() => t.to_string(),
        (_, Some(rank)) => match state.trends.cached_item(rank) {
            Some(item) => item.title,
            None => return bad_request(format!("no trend with rank {rank} in the current list")),
        },
        _ => return bad_request("either `term` or `rank` is required"),
    };

    let output = state
        .generator
        .generate_with_key(&term, body.mode, body.api_key.as_deref())
        .await;

    Json(GenerateResp {
        term,
        mode: body.mode,
        label: body.mode.label(),
        output,
    })
    .into_response()
}
