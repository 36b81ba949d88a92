//! Route table and HTTP plumbing. One handler per routable operation;
//! the static `/api/data` and `/api/drive/*` routes win over the
//! `{kind}` entity routes.

pub mod data;
pub mod entities;
pub mod files;
pub mod health;

use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use shared::{counter, histogram};

use crate::metrics_defs;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/data", get(data::load_data))
        .route("/api/drive/files", get(files::drive_list))
        .route("/api/drive/search", get(files::drive_search))
        .route(
            "/api/projects/{project_id}/files",
            get(files::project_files).post(files::attach_file),
        )
        .route("/api/{kind}", post(entities::create))
        .route(
            "/api/{kind}/{id}",
            put(entities::update).delete(entities::destroy),
        )
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Records one count and one duration sample per request, labelled with
/// the matched route template rather than the raw path so per-entity ids
/// do not explode label cardinality.
async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        metrics_defs::REQUEST_COUNT,
        "route" => route.clone(),
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        metrics_defs::REQUEST_DURATION,
        "route" => route,
        "method" => method,
        "status" => status
    )
    .record(started.elapsed().as_secs_f64());

    response
}
