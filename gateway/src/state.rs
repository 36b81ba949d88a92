use std::sync::Arc;

use backends::{
    BridgeClient, CredentialValidator, DriveClient, HttpCredentialValidator, Operations,
    WorkbookClient,
};
use dispatch::{
    Dispatched, Dispatcher, MemoryInvalidationStore, MetricsObserver, Observer, Operation,
    Principal, ResourceClass, TracingObserver,
};

use crate::config::Config;
use crate::errors::ApiError;

/// Everything handlers need, shared across requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    dispatcher: Dispatcher,
    operations: Operations,
    validator: Arc<dyn CredentialValidator>,
    expose_error_detail: bool,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        operations: Operations,
        validator: Arc<dyn CredentialValidator>,
        expose_error_detail: bool,
    ) -> Self {
        AppState {
            inner: Arc::new(Inner {
                dispatcher,
                operations,
                validator,
                expose_error_detail,
            }),
        }
    }

    /// Builds the production wiring: one shared HTTP client, real backend
    /// clients, the tokeninfo validator and an in-process invalidation
    /// registry.
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let workbook = Arc::new(WorkbookClient::new(
            client.clone(),
            config.primary.workbook_url.clone(),
            config.primary.workbook_id.clone(),
        ));
        let drive = Arc::new(DriveClient::new(
            client.clone(),
            config.primary.drive_url.clone(),
            config.primary.drive_id.clone(),
        ));
        let bridge = Arc::new(BridgeClient::new(
            client.clone(),
            config.legacy.exec_url.clone(),
        ));
        let validator = Arc::new(HttpCredentialValidator::new(
            client,
            config.auth.tokeninfo_url.clone(),
        ));
        let observers: Vec<Arc<dyn Observer>> =
            vec![Arc::new(TracingObserver), Arc::new(MetricsObserver)];
        let dispatcher = Dispatcher::new(
            config.dispatch.clone(),
            Arc::new(MemoryInvalidationStore::new()),
            observers,
        );

        AppState::new(
            dispatcher,
            Operations::new(workbook, drive, bridge),
            validator,
            config.expose_error_detail,
        )
    }

    pub fn operations(&self) -> &Operations {
        &self.inner.operations
    }

    pub fn validator(&self) -> &dyn CredentialValidator {
        self.inner.validator.as_ref()
    }

    /// Routes one operation and maps failures onto the wire error.
    pub async fn run<I, O>(
        &self,
        operation: &Operation<I, O>,
        principal: &Principal,
        class: &ResourceClass,
        input: &I,
    ) -> Result<Dispatched<O>, ApiError>
    where
        I: Send + Sync + 'static,
        O: Send + 'static,
    {
        self.inner
            .dispatcher
            .execute(operation, principal, class, input)
            .await
            .map_err(|error| {
                ApiError::from_dispatch(operation.name(), error, self.inner.expose_error_detail)
            })
    }
}
