//! Client for the file drive API backing project attachments.

use dispatch::{BackendError, CacheMode, Principal};
use serde::Serialize;
use url::Url;

use crate::http::{prepare, read_json, transport_error};
use crate::types::{DriveFile, FilePage, PageRequest};

pub struct DriveClient {
    client: reqwest::Client,
    base_url: Url,
    drive_id: String,
}

impl DriveClient {
    pub fn new<S: Into<String>>(client: reqwest::Client, base_url: Url, drive_id: S) -> Self {
        DriveClient {
            client,
            base_url,
            drive_id: drive_id.into(),
        }
    }

    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Lists files in the drive, optionally filtered by a query
    /// expression in the drive API's query language.
    pub async fn list(
        &self,
        principal: &Principal,
        query: Option<&str>,
        page: &PageRequest,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let url = format!("{}/v1/files", self.base());
        let mut request = prepare(self.client.get(url), principal, cache)
            .query(&[("drive", self.drive_id.as_str())]);
        if let Some(query) = query {
            request = request.query(&[("q", query)]);
        }
        if let Some(token) = &page.page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }
        if let Some(size) = page.page_size {
            request = request.query(&[("pageSize", size)]);
        }
        let response = request.send().await.map_err(transport_error)?;
        read_json(response).await
    }

    pub async fn list_children(
        &self,
        principal: &Principal,
        folder_id: &str,
        page: &PageRequest,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let query = format!("'{}' in parents", escape(folder_id));
        self.list(principal, Some(&query), page, cache).await
    }

    pub async fn search(
        &self,
        principal: &Principal,
        term: &str,
        page: &PageRequest,
        cache: CacheMode,
    ) -> Result<FilePage, BackendError> {
        let query = format!("name contains '{}'", escape(term));
        self.list(principal, Some(&query), page, cache).await
    }

    pub async fn create_file(
        &self,
        principal: &Principal,
        name: &str,
        mime_type: Option<&str>,
        parent: Option<&str>,
        cache: CacheMode,
    ) -> Result<DriveFile, BackendError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateFileBody<'a> {
            name: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            mime_type: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            parent: Option<&'a str>,
            drive: &'a str,
        }

        let url = format!("{}/v1/files", self.base());
        let body = CreateFileBody {
            name,
            mime_type,
            parent,
            drive: &self.drive_id,
        };
        let response = prepare(self.client.post(url), principal, cache)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

/// Escapes a value for embedding in a single-quoted query literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
