pub mod auth;
pub mod bridge;
pub mod drive;
pub mod ops;
pub mod types;
pub mod workbook;

mod http;
#[cfg(test)]
mod testutils;

pub use auth::{AuthError, CredentialValidator, HttpCredentialValidator};
pub use bridge::BridgeClient;
pub use drive::DriveClient;
pub use ops::Operations;
pub use types::{
    AttachFileRequest, DriveFile, DriveListQuery, DriveSearchQuery, EntityDraft, EntityKind,
    EntityRecord, EntityRef, EntityUpdate, FilePage, PageRequest, ProjectFilesQuery, Snapshot,
};
pub use workbook::WorkbookClient;
