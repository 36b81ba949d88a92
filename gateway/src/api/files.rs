//! File handlers: project attachments plus raw drive listing and
//! search.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use backends::{
    AttachFileRequest, DriveFile, DriveListQuery, DriveSearchQuery, FilePage, PageRequest,
    ProjectFilesQuery,
};
use dispatch::ResourceClass;
use serde::Deserialize;

use crate::auth::Caller;
use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    page_token: Option<String>,
    page_size: Option<u32>,
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        PageRequest {
            page_token: params.page_token,
            page_size: params.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    page_token: Option<String>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachBody {
    name: String,
    #[serde(default)]
    mime_type: Option<String>,
}

pub async fn project_files(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(project_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Envelope<FilePage>, ApiError> {
    let class = ResourceClass::project_files(&project_id);
    let query = ProjectFilesQuery {
        project_id,
        page: page.into(),
    };
    let operations = state.operations();
    let dispatched = state
        .run(&operations.project_files, &principal, &class, &query)
        .await?;
    Ok(Envelope::success(dispatched))
}

pub async fn attach_file(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(project_id): Path<String>,
    body: Result<Json<AttachBody>, JsonRejection>,
) -> Result<Envelope<DriveFile>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("file name cannot be empty"));
    }
    let class = ResourceClass::project_files(&project_id);
    let request = AttachFileRequest {
        project_id,
        name: body.name,
        mime_type: body.mime_type,
    };
    let operations = state.operations();
    let dispatched = state
        .run(&operations.attach_file, &principal, &class, &request)
        .await?;
    Ok(Envelope::success(dispatched))
}

pub async fn drive_list(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(page): Query<PageParams>,
) -> Result<Envelope<FilePage>, ApiError> {
    let query = DriveListQuery { page: page.into() };
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.drive_list,
            &principal,
            &ResourceClass::drive_files(),
            &query,
        )
        .await?;
    Ok(Envelope::success(dispatched))
}

pub async fn drive_search(
    State(state): State<AppState>,
    Caller(principal): Caller,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Envelope<FilePage>, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let term = params
        .q
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing search term: q"))?;
    let search = DriveSearchQuery {
        term,
        page: PageRequest {
            page_token: params.page_token,
            page_size: params.page_size,
        },
    };
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.drive_search,
            &principal,
            &ResourceClass::drive_files(),
            &search,
        )
        .await?;
    Ok(Envelope::success(dispatched))
}
