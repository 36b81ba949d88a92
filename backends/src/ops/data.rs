//! Entity operations: the full snapshot load plus row-level mutations,
//! each with a workbook-backed primary executor and a bridge-backed
//! legacy one.

use std::sync::Arc;

use async_trait::async_trait;
use dispatch::{BackendError, BackendExecutor, CacheMode, Principal};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::BridgeClient;
use crate::types::{EntityDraft, EntityKind, EntityRecord, EntityRef, EntityUpdate, Snapshot};
use crate::workbook::WorkbookClient;

#[derive(Serialize)]
struct EmptyPayload {}

/// Wire shape the bridge expects for every entity mutation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityPayload<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a Map<String, Value>>,
}

pub struct LoadSnapshotPrimary {
    workbook: Arc<WorkbookClient>,
}

impl LoadSnapshotPrimary {
    pub fn new(workbook: Arc<WorkbookClient>) -> Self {
        LoadSnapshotPrimary { workbook }
    }
}

#[async_trait]
impl BackendExecutor<(), Snapshot> for LoadSnapshotPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        _input: &(),
        cache: CacheMode,
    ) -> Result<Snapshot, BackendError> {
        self.workbook
            .fetch_rows(principal, &EntityKind::ALL, cache)
            .await
    }
}

pub struct LoadSnapshotLegacy {
    bridge: Arc<BridgeClient>,
}

impl LoadSnapshotLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        LoadSnapshotLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<(), Snapshot> for LoadSnapshotLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        _input: &(),
        cache: CacheMode,
    ) -> Result<Snapshot, BackendError> {
        self.bridge
            .call(principal, "loadData", &EmptyPayload {}, cache)
            .await
    }
}

pub struct CreateEntityPrimary {
    workbook: Arc<WorkbookClient>,
}

impl CreateEntityPrimary {
    pub fn new(workbook: Arc<WorkbookClient>) -> Self {
        CreateEntityPrimary { workbook }
    }
}

#[async_trait]
impl BackendExecutor<EntityDraft, EntityRecord> for CreateEntityPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityDraft,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        self.workbook
            .create_row(principal, input.kind, &input.fields, cache)
            .await
    }
}

pub struct CreateEntityLegacy {
    bridge: Arc<BridgeClient>,
}

impl CreateEntityLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        CreateEntityLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<EntityDraft, EntityRecord> for CreateEntityLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityDraft,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        let payload = EntityPayload {
            kind: input.kind.sheet(),
            id: None,
            fields: Some(&input.fields),
        };
        self.bridge
            .call(principal, "createEntity", &payload, cache)
            .await
    }
}

pub struct UpdateEntityPrimary {
    workbook: Arc<WorkbookClient>,
}

impl UpdateEntityPrimary {
    pub fn new(workbook: Arc<WorkbookClient>) -> Self {
        UpdateEntityPrimary { workbook }
    }
}

#[async_trait]
impl BackendExecutor<EntityUpdate, EntityRecord> for UpdateEntityPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityUpdate,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        self.workbook
            .update_row(principal, input.kind, &input.id, &input.fields, cache)
            .await
    }
}

pub struct UpdateEntityLegacy {
    bridge: Arc<BridgeClient>,
}

impl UpdateEntityLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        UpdateEntityLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<EntityUpdate, EntityRecord> for UpdateEntityLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityUpdate,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        let payload = EntityPayload {
            kind: input.kind.sheet(),
            id: Some(&input.id),
            fields: Some(&input.fields),
        };
        self.bridge
            .call(principal, "updateEntity", &payload, cache)
            .await
    }
}

pub struct DeleteEntityPrimary {
    workbook: Arc<WorkbookClient>,
}

impl DeleteEntityPrimary {
    pub fn new(workbook: Arc<WorkbookClient>) -> Self {
        DeleteEntityPrimary { workbook }
    }
}

#[async_trait]
impl BackendExecutor<EntityRef, ()> for DeleteEntityPrimary {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityRef,
        cache: CacheMode,
    ) -> Result<(), BackendError> {
        self.workbook
            .delete_row(principal, input.kind, &input.id, cache)
            .await
    }
}

pub struct DeleteEntityLegacy {
    bridge: Arc<BridgeClient>,
}

impl DeleteEntityLegacy {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        DeleteEntityLegacy { bridge }
    }
}

#[async_trait]
impl BackendExecutor<EntityRef, ()> for DeleteEntityLegacy {
    async fn execute(
        &self,
        principal: &Principal,
        input: &EntityRef,
        cache: CacheMode,
    ) -> Result<(), BackendError> {
        let payload = EntityPayload {
            kind: input.kind.sheet(),
            id: Some(&input.id),
            fields: None,
        };
        self.bridge
            .call_unit(principal, "deleteEntity", &payload, cache)
            .await
    }
}
