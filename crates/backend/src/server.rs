//! HTTP front end for the hash and stats stores.
//!
//! Thin glue: each handler turns a request into one actor call and maps the
//! reply onto a status code. No store state lives here.
//!
//! # Routes
//!
//! ```text
//! POST /hash        form `password`   → 201 + id | 400 (empty / closing)
//! GET  /hash/{id}                     → 200 + digest | 404 | 400
//! GET  /hash/                         → 400 (missing id)
//! GET  /stats                         → 200 {"total", "average"}
//! POST /shutdown                      → 200, starts draining
//! ```
//!
//! Latency of every `/hash` request (including rejected ones) is recorded
//! from a detached task once the response is ready.

use std::time::Instant;

use axum::{
  Form, Json, Router,
  extract::{Path, Request, State, rejection::FormRejection},
  http::StatusCode,
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
  classify::{ServerErrorsAsFailures, SharedClassifier},
  trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, warn};

use crate::actor::{
  handle::{HashStoreHandle, SendError, StatsHandle},
  message::{HashId, Reservation, StatsSnapshot},
};

// ============================================================================
// State
// ============================================================================

/// Handles shared by every request
#[derive(Clone, Debug)]
pub struct AppState {
  pub hashes: HashStoreHandle,
  pub stats: StatsHandle,
}

impl AppState {
  pub fn new(hashes: HashStoreHandle, stats: StatsHandle) -> Self {
    Self { hashes, stats }
  }
}

/// Build the router with access logging and `/hash` latency tracking
pub fn router(state: AppState) -> Router {
  let hash_route = post(post_hash).layer(middleware::from_fn_with_state(state.clone(), record_latency));

  Router::new()
    .route("/hash", hash_route)
    .route("/hash/", get(missing_hash_id))
    .route("/hash/{id}", get(get_hash))
    .route("/stats", get(get_stats))
    .route("/shutdown", post(post_shutdown))
    .layer(access_log())
    .with_state(state)
}

/// One INFO span per request and one INFO line when its response is ready
fn access_log() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
  TraceLayer::new_for_http()
    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
    .on_response(DefaultOnResponse::new().level(Level::INFO))
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct HashForm {
  #[serde(default)]
  password: String,
}

/// Body of `GET /stats`; both fields are zero until a request is recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
  /// Number of `/hash` requests served
  pub total: u64,
  /// Mean latency in microseconds
  pub average: u64,
}

impl From<StatsSnapshot> for StatsReport {
  fn from(snapshot: StatsSnapshot) -> Self {
    if snapshot.count == 0 {
      return Self::default();
    }
    Self {
      total: snapshot.count,
      average: snapshot.total_latency_micros / snapshot.count,
    }
  }
}

// ============================================================================
// Errors
// ============================================================================

/// Client-visible failures
#[derive(Debug, thiserror::Error)]
enum ApiError {
  #[error("Form variable password can not be empty")]
  EmptyPassword,
  #[error("Server Closing")]
  ServerClosing,
  #[error("Bad Request")]
  InvalidId,
  #[error("Bad Request")]
  MalformedForm,
  #[error("Not Found")]
  NotFound,
  #[error("Internal Server Error")]
  Unavailable(#[from] SendError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::EmptyPassword | Self::ServerClosing | Self::InvalidId | Self::MalformedForm => StatusCode::BAD_REQUEST,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::Unavailable(e) => {
        warn!(error = %e, "Store unavailable");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, self.to_string()).into_response()
  }
}

// ============================================================================
// Handlers
// ============================================================================

async fn post_hash(
  State(state): State<AppState>,
  form: Result<Form<HashForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let form = match form {
    Ok(Form(form)) => form,
    // A body that is not a form carries no password at all
    Err(FormRejection::InvalidFormContentType(_)) => HashForm::default(),
    Err(e) => {
      warn!(error = %e, "Unable to parse POST /hash form");
      return Err(ApiError::MalformedForm);
    }
  };

  // Only reject blank input; surrounding spaces are part of the password.
  if form.password.trim().is_empty() {
    warn!("password value in POST body is empty");
    return Err(ApiError::EmptyPassword);
  }

  match state.hashes.reserve(form.password).await? {
    Reservation::Accepted(id) => Ok((StatusCode::CREATED, id.to_string())),
    Reservation::Rejected => {
      info!("Rejected POST /hash because the server is draining");
      Err(ApiError::ServerClosing)
    }
  }
}

async fn get_hash(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<String, ApiError> {
  let parsed: i64 = raw_id.parse().map_err(|e| {
    warn!(id = %raw_id, error = %e, "Unable to parse hash id");
    ApiError::InvalidId
  })?;

  // Well-formed but negative ids can never have been issued
  let Ok(id) = HashId::try_from(parsed) else {
    return Err(ApiError::NotFound);
  };

  state.hashes.retrieve(id).await?.ok_or(ApiError::NotFound)
}

async fn missing_hash_id() -> ApiError {
  warn!("GET /hash/ without an id");
  ApiError::InvalidId
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsReport>, ApiError> {
  let snapshot = state.stats.snapshot().await?;
  Ok(Json(StatsReport::from(snapshot)))
}

async fn post_shutdown(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
  let phase = state.hashes.request_shutdown().await?;
  info!(phase = phase.as_str(), "Shutdown requested over HTTP");
  Ok(StatusCode::OK)
}

/// Time the wrapped route and hand the sample to the stats store
async fn record_latency(State(state): State<AppState>, request: Request, next: Next) -> Response {
  let started = Instant::now();
  let response = next.run(request).await;
  state.stats.record_detached(started.elapsed());
  response
}
