//! The operation catalog: every routable operation, wired to its
//! workbook or drive primary executor and its bridge legacy executor.

pub mod data;
pub mod files;

use std::sync::Arc;

use dispatch::Operation;

use crate::bridge::BridgeClient;
use crate::drive::DriveClient;
use crate::ops::data::{
    CreateEntityLegacy, CreateEntityPrimary, DeleteEntityLegacy, DeleteEntityPrimary,
    LoadSnapshotLegacy, LoadSnapshotPrimary, UpdateEntityLegacy, UpdateEntityPrimary,
};
use crate::ops::files::{
    AttachFileLegacy, AttachFilePrimary, DriveListLegacy, DriveListPrimary, DriveSearchLegacy,
    DriveSearchPrimary, ProjectFilesLegacy, ProjectFilesPrimary,
};
use crate::types::{
    AttachFileRequest, DriveFile, DriveListQuery, DriveSearchQuery, EntityDraft, EntityRecord,
    EntityRef, EntityUpdate, FilePage, ProjectFilesQuery, Snapshot,
};
use crate::workbook::WorkbookClient;

pub struct Operations {
    pub load_snapshot: Operation<(), Snapshot>,
    pub create_entity: Operation<EntityDraft, EntityRecord>,
    pub update_entity: Operation<EntityUpdate, EntityRecord>,
    pub delete_entity: Operation<EntityRef, ()>,
    pub project_files: Operation<ProjectFilesQuery, FilePage>,
    pub attach_file: Operation<AttachFileRequest, DriveFile>,
    pub drive_list: Operation<DriveListQuery, FilePage>,
    pub drive_search: Operation<DriveSearchQuery, FilePage>,
}

impl Operations {
    pub fn new(
        workbook: Arc<WorkbookClient>,
        drive: Arc<DriveClient>,
        bridge: Arc<BridgeClient>,
    ) -> Self {
        Operations {
            load_snapshot: Operation::read(
                "data.load",
                Arc::new(LoadSnapshotPrimary::new(workbook.clone())),
                Arc::new(LoadSnapshotLegacy::new(bridge.clone())),
            ),
            create_entity: Operation::write(
                "entity.create",
                Arc::new(CreateEntityPrimary::new(workbook.clone())),
                Arc::new(CreateEntityLegacy::new(bridge.clone())),
            ),
            update_entity: Operation::write(
                "entity.update",
                Arc::new(UpdateEntityPrimary::new(workbook.clone())),
                Arc::new(UpdateEntityLegacy::new(bridge.clone())),
            ),
            delete_entity: Operation::write(
                "entity.delete",
                Arc::new(DeleteEntityPrimary::new(workbook.clone())),
                Arc::new(DeleteEntityLegacy::new(bridge.clone())),
            ),
            project_files: Operation::read(
                "files.project.list",
                Arc::new(ProjectFilesPrimary::new(workbook.clone(), drive.clone())),
                Arc::new(ProjectFilesLegacy::new(bridge.clone())),
            ),
            attach_file: Operation::write(
                "files.project.attach",
                Arc::new(AttachFilePrimary::new(workbook, drive.clone())),
                Arc::new(AttachFileLegacy::new(bridge.clone())),
            ),
            drive_list: Operation::read(
                "drive.list",
                Arc::new(DriveListPrimary::new(drive.clone())),
                Arc::new(DriveListLegacy::new(bridge.clone())),
            ),
            drive_search: Operation::read(
                "drive.search",
                Arc::new(DriveSearchPrimary::new(drive)),
                Arc::new(DriveSearchLegacy::new(bridge)),
            ),
        }
    }
}
