//! Entity CRUD handlers. The `{kind}` path segment selects the sheet;
//! anything outside tasks/projects/areas is a caller error, not a
//! backend call.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use backends::{EntityDraft, EntityKind, EntityRecord, EntityRef, EntityUpdate};
use dispatch::ResourceClass;
use serde_json::{Map, Value};

use crate::auth::Caller;
use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::state::AppState;

fn entity_kind(segment: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_path(segment)
        .ok_or_else(|| ApiError::bad_request(format!("unknown entity kind: {segment}")))
}

fn entity_fields(
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Map<String, Value>, ApiError> {
    let Json(fields) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(fields)
}

pub async fn create(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(kind): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Envelope<EntityRecord>, ApiError> {
    let draft = EntityDraft {
        kind: entity_kind(&kind)?,
        fields: entity_fields(body)?,
    };
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.create_entity,
            &principal,
            &ResourceClass::tasks(),
            &draft,
        )
        .await?;
    Ok(Envelope::success(dispatched))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Envelope<EntityRecord>, ApiError> {
    let update = EntityUpdate {
        kind: entity_kind(&kind)?,
        id,
        fields: entity_fields(body)?,
    };
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.update_entity,
            &principal,
            &ResourceClass::tasks(),
            &update,
        )
        .await?;
    Ok(Envelope::success(dispatched))
}

pub async fn destroy(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Envelope<()>, ApiError> {
    let entity = EntityRef {
        kind: entity_kind(&kind)?,
        id,
    };
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.delete_entity,
            &principal,
            &ResourceClass::tasks(),
            &entity,
        )
        .await?;
    Ok(Envelope::empty(dispatched))
}
