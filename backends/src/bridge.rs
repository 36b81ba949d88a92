//! Client for the legacy automation bridge. Every call is a single POST
//! to the bridge's exec endpoint carrying an action name and a JSON
//! payload; the bridge wraps results in its own status envelope.

use dispatch::{BackendError, CacheMode, Principal};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{prepare, read_json, transport_error};

#[derive(Serialize)]
struct BridgeRequest<'a, P> {
    action: &'static str,
    payload: &'a P,
}

#[derive(Deserialize)]
struct BridgeEnvelope<T> {
    status: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

pub struct BridgeClient {
    client: reqwest::Client,
    exec_url: Url,
}

impl BridgeClient {
    pub fn new(client: reqwest::Client, exec_url: Url) -> Self {
        BridgeClient { client, exec_url }
    }

    /// Invokes an action and decodes its data payload.
    pub async fn call<P, T>(
        &self,
        principal: &Principal,
        action: &'static str,
        payload: &P,
        cache: CacheMode,
    ) -> Result<T, BackendError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let envelope: BridgeEnvelope<T> = self.exchange(principal, action, payload, cache).await?;
        if let Some(error) = bridge_failure(action, &envelope.status, envelope.message) {
            return Err(error);
        }
        envelope
            .data
            .ok_or_else(|| BackendError::InvalidResponse(format!("bridge {action} returned no data")))
    }

    /// Invokes an action whose success carries no data.
    pub async fn call_unit<P>(
        &self,
        principal: &Principal,
        action: &'static str,
        payload: &P,
        cache: CacheMode,
    ) -> Result<(), BackendError>
    where
        P: Serialize + Sync,
    {
        let envelope: BridgeEnvelope<serde_json::Value> =
            self.exchange(principal, action, payload, cache).await?;
        match bridge_failure(action, &envelope.status, envelope.message) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn exchange<P, T>(
        &self,
        principal: &Principal,
        action: &'static str,
        payload: &P,
        cache: CacheMode,
    ) -> Result<BridgeEnvelope<T>, BackendError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = prepare(self.client.post(self.exec_url.clone()), principal, cache)
            .json(&BridgeRequest { action, payload })
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

/// The bridge reports script-level failures with HTTP 200 and an error
/// status in the envelope. Those are refusals the primary backend would
/// repeat, not outages, so they map to a permanent rejection.
fn bridge_failure(
    action: &'static str,
    status: &str,
    message: Option<String>,
) -> Option<BackendError> {
    match status {
        "ok" => None,
        "error" => Some(BackendError::Rejected {
            status: 400,
            detail: message.unwrap_or_else(|| format!("bridge {action} reported an error")),
        }),
        other => Some(BackendError::InvalidResponse(format!(
            "bridge {action} returned unknown status {other:?}"
        ))),
    }
}
