//! In-memory episode API used as a fixture by the integration tests.
//!
//! Responses use `snake_case` keys. Besides the episode resource it exposes
//! `/api/echo` (reflects the request back), `/api/slow` (delays its answer)
//! and `/api/hits` (how many requests the server has handled, excluding
//! itself).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const PAGE_SIZE: usize = 20;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub id: Uuid,
    pub name: String,
    pub air_date: String,
    pub episode_code: String,
}

#[derive(Deserialize)]
pub struct CreateEpisode {
    pub name: String,
    pub air_date: String,
    #[serde(default)]
    pub episode_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: usize,
    pub pages: usize,
    pub next_page: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EpisodePage {
    pub info: PageInfo,
    pub results: Vec<Episode>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub name: Option<String>,
}

/// What `/api/echo` saw.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct SlowParams {
    #[serde(default)]
    pub ms: u64,
}

#[derive(Clone, Default)]
pub struct AppState {
    episodes: Arc<RwLock<HashMap<Uuid, Episode>>>,
    hits: Arc<AtomicU64>,
}

pub fn app() -> Router {
    let state = AppState::default();
    Router::new()
        .route("/api/episode", get(list_episodes).post(create_episode))
        .route("/api/episode/{id}", get(get_episode).delete(delete_episode))
        .route("/api/echo", any(echo))
        .route("/api/slow", get(slow))
        .route("/api/hits", get(hits))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn count_hits(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.uri().path() != "/api/hits" {
        state.hits.fetch_add(1, Ordering::SeqCst);
    }
    next.run(request).await
}

async fn list_episodes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<EpisodePage> {
    let episodes = state.episodes.read().await;
    let mut matching: Vec<Episode> = episodes
        .values()
        .filter(|e| {
            params
                .name
                .as_deref()
                .map_or(true, |name| e.name.to_lowercase().contains(&name.to_lowercase()))
        })
        .cloned()
        .collect();
    matching.sort_by(|a, b| (&a.air_date, &a.name).cmp(&(&b.air_date, &b.name)));

    let count = matching.len();
    let pages = count.div_ceil(PAGE_SIZE).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let results = matching
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    Json(EpisodePage {
        info: PageInfo {
            count,
            pages,
            next_page: (page < pages).then_some(page + 1),
        },
        results,
    })
}

async fn create_episode(
    State(state): State<AppState>,
    Json(input): Json<CreateEpisode>,
) -> (StatusCode, Json<Episode>) {
    let episode = Episode {
        id: Uuid::new_v4(),
        name: input.name,
        air_date: input.air_date,
        episode_code: input.episode_code,
    };
    state
        .episodes
        .write()
        .await
        .insert(episode.id, episode.clone());
    (StatusCode::CREATED, Json(episode))
}

async fn get_episode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Episode>, StatusCode> {
    let episodes = state.episodes.read().await;
    episodes.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_episode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut episodes = state.episodes.write().await;
    episodes
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn slow(Query(params): Query<SlowParams>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(serde_json::json!({ "waited_ms": params.ms }))
}

async fn hits(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "hits": state.hits.load(Ordering::SeqCst) }))
}
