//! Client for the workbook row API, the primary store for tasks,
//! projects and areas.

use dispatch::{BackendError, CacheMode, Principal};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::http::{expect_success, prepare, read_json, transport_error};
use crate::types::{EntityKind, EntityRecord, Snapshot};

#[derive(Deserialize)]
struct SheetRows {
    #[serde(default)]
    rows: Vec<EntityRecord>,
}

/// Sheets keyed by tab name, in workbook tab order.
#[derive(Deserialize)]
struct RowsResponse {
    sheets: IndexMap<String, SheetRows>,
}

pub struct WorkbookClient {
    client: reqwest::Client,
    base_url: Url,
    workbook_id: String,
}

impl WorkbookClient {
    pub fn new<S: Into<String>>(client: reqwest::Client, base_url: Url, workbook_id: S) -> Self {
        WorkbookClient {
            client,
            base_url,
            workbook_id: workbook_id.into(),
        }
    }

    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Fetches the requested sheets in one round trip and assembles them
    /// into a snapshot. Sheets missing from the workbook come back empty.
    pub async fn fetch_rows(
        &self,
        principal: &Principal,
        sheets: &[EntityKind],
        cache: CacheMode,
    ) -> Result<Snapshot, BackendError> {
        let names: Vec<&str> = sheets.iter().map(|kind| kind.sheet()).collect();
        let url = format!("{}/v1/workbooks/{}/rows", self.base(), self.workbook_id);
        let response = prepare(self.client.get(url), principal, cache)
            .query(&[("sheets", names.join(","))])
            .send()
            .await
            .map_err(transport_error)?;
        let rows: RowsResponse = read_json(response).await?;

        let mut sheets = rows.sheets;
        let mut take = |kind: EntityKind| {
            sheets
                .shift_remove(kind.sheet())
                .map(|sheet| sheet.rows)
                .unwrap_or_default()
        };
        Ok(Snapshot {
            tasks: take(EntityKind::Task),
            projects: take(EntityKind::Project),
            areas: take(EntityKind::Area),
        })
    }

    pub async fn fetch_row(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: &str,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        let url = format!(
            "{}/v1/workbooks/{}/sheets/{}/rows/{}",
            self.base(),
            self.workbook_id,
            kind.sheet(),
            id
        );
        let response = prepare(self.client.get(url), principal, cache)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    pub async fn create_row(
        &self,
        principal: &Principal,
        kind: EntityKind,
        fields: &Map<String, Value>,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        let url = format!(
            "{}/v1/workbooks/{}/sheets/{}/rows",
            self.base(),
            self.workbook_id,
            kind.sheet()
        );
        let response = prepare(self.client.post(url), principal, cache)
            .json(fields)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    pub async fn update_row(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: &str,
        fields: &Map<String, Value>,
        cache: CacheMode,
    ) -> Result<EntityRecord, BackendError> {
        let url = format!(
            "{}/v1/workbooks/{}/sheets/{}/rows/{}",
            self.base(),
            self.workbook_id,
            kind.sheet(),
            id
        );
        let response = prepare(self.client.patch(url), principal, cache)
            .json(fields)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    pub async fn delete_row(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: &str,
        cache: CacheMode,
    ) -> Result<(), BackendError> {
        let url = format!(
            "{}/v1/workbooks/{}/sheets/{}/rows/{}",
            self.base(),
            self.workbook_id,
            kind.sheet(),
            id
        );
        let response = prepare(self.client.delete(url), principal, cache)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response).await?;
        Ok(())
    }
}
