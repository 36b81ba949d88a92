//! File operations. Project attachments resolve the project's folder
//! from the workbook first, then list or create inside that folder on
//! the drive; the legacy bridge does both steps behind one action.

use std::sync::Arc;

use async_trait::async_trait;
use dispatch::{BackendError, BackendExecutor, CacheMode, Principal};
use serde::Serialize;
use serde_json::Value;

use crate::bridge::BridgeClient;
use crate::drive::DriveClient;
use crate::types::{
    AttachFileRequest, DriveFile, DriveListQuery, DriveSearchQuery, EntityKind, FilePage,
    ProjectFilesQuery,
};
use crate::workbook::WorkbookClient;

/// Workbook column that links a project row to its drive folder.
const FOLDER_FIELD: &str = "folder_id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFilesPayload<'a> {
    project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachPayload<'a> {
    project_id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

pub struct ProjectFilesPrimary {
    workbook: Arc<WorkbookClient>,
    drive: Arc<DriveClient>,
}

impl ProjectFilesPrimary {
    pub fn new(workbook: Arc<WorkbookClient>, drive: Arc<DriveClient>) -> Self {
        ProjectFilesPrimary { workbook, drive }
    }
}

async fn resolve_folder(
    workbook: &WorkbookClient,
    principal: &Principal,
    project_id: &str,
    cache: CacheMode,
) -> Result<Option<String>, BackendError> {
    let record = workbook
        .fetch_row(principal, EntityKind::Project, project_id, cache)
        .await?;
    Ok(record
        .fields
        .get(FOLDER_FIELD)
        .and_then(Value::as_str)
        .filter(|folder| !folder.is_empty())
        .map(str::to_owned))
}

#[async_trait]
impl BackendExecutor<ProjectFilesQuery, FilePage> for ProjectFilesPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &ProjectFilesQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let folder = resolve_folder(&self.workbook, principal, &input.project_id, cache).await?;
        match folder {
            Some(folder) => {
                self.drive
                    .list_children(principal, &folder, &input.page, cache)
                    .await
            }
            // A project with no folder simply has no attachments yet.
            None => Ok(FilePage::default()),
        }
    }
}

pub struct ProjectFilesLegacy {
    bridge: Arc<BridgeClient>,
}

impl ProjectFilesLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        ProjectFilesLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<ProjectFilesQuery, FilePage> for ProjectFilesLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &ProjectFilesQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let payload = ProjectFilesPayload {
            project_id: &input.project_id,
            page_token: input.page.page_token.as_deref(),
            page_size: input.page.page_size,
        };
        self.bridge
            .call(principal, "listProjectFiles", &payload, cache)
            .await
    }
}

pub struct AttachFilePrimary {
    workbook: Arc<WorkbookClient>,
    drive: Arc<DriveClient>,
}

impl AttachFilePrimary {
    pub fn new(workbook: Arc<WorkbookClient>, drive: Arc<DriveClient>) -> Self {
        AttachFilePrimary { workbook, drive }
    }
}

#[async_trait]
impl BackendExecutor<AttachFileRequest, DriveFile> for AttachFilePrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &AttachFileRequest,
        cache: CacheMode,
    ) -> Result<DriveFile, BackendError> {
        let folder = resolve_folder(&self.workbook, principal, &input.project_id, cache).await?;
        let Some(folder) = folder else {
            return Err(BackendError::Rejected {
                status: 409,
                detail: format!("project {} has no attachments folder", input.project_id),
            });
        };
        self.drive
            .create_file(
                principal,
                &input.name,
                input.mime_type.as_deref(),
                Some(&folder),
                cache,
            )
            .await
    }
}

pub struct AttachFileLegacy {
    bridge: Arc<BridgeClient>,
}

impl AttachFileLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        AttachFileLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<AttachFileRequest, DriveFile> for AttachFileLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &AttachFileRequest,
        cache: CacheMode,
    ) -> Result<DriveFile, BackendError> {
        let payload = AttachPayload {
            project_id: &input.project_id,
            name: &input.name,
            mime_type: input.mime_type.as_deref(),
        };
        self.bridge
            .call(principal, "attachProjectFile", &payload, cache)
            .await
    }
}

pub struct DriveListPrimary {
    drive: Arc<DriveClient>,
}

impl DriveListPrimary {
    pub fn new(drive: Arc<DriveClient>) -> Self {
        DriveListPrimary { drive }
    }
}

#[async_trait]
impl BackendExecutor<DriveListQuery, FilePage> for DriveListPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &DriveListQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        self.drive.list(principal, None, &input.page, cache).await
    }
}

pub struct DriveListLegacy {
    bridge: Arc<BridgeClient>,
}

impl DriveListLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        DriveListLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<DriveListQuery, FilePage> for DriveListLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &DriveListQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let payload = PagePayload {
            page_token: input.page.page_token.as_deref(),
            page_size: input.page.page_size,
        };
        self.bridge
            .call(principal, "listDriveFiles", &payload, cache)
            .await
    }
}

pub struct DriveSearchPrimary {
    drive: Arc<DriveClient>,
}

impl DriveSearchPrimary {
    pub fn new(drive: Arc<DriveClient>) -> Self {
        DriveSearchPrimary { drive }
    }
}

#[async_trait]
impl BackendExecutor<DriveSearchQuery, FilePage> for DriveSearchPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &DriveSearchQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        self.drive
            .search(principal, &input.term, &input.page, cache)
            .await
    }
}

pub struct DriveSearchLegacy {
    bridge: Arc<BridgeClient>,
}

impl DriveSearchLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        DriveSearchLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<DriveSearchQuery, FilePage> for DriveSearchLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &DriveSearchQuery,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let payload = SearchPayload {
            query: &input.term,
            page_token: input.page.page_token.as_deref(),
            page_size: input.page.page_size,
        };
        self.bridge
            .call(principal, "searchDriveFiles", &payload, cache)
            .await
    }
}
