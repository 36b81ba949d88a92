use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::principal::Principal;
use crate::types::{CacheMode, OperationKind};

/// One backend's implementation of an operation. Executors own all
/// backend-specific plumbing; the dispatcher only sees typed input and
/// output and a `BackendError` on failure.
#[async_trait]
pub trait BackendExecutor<I, O>: Send + Sync
where
    I: Send + Sync,
    O: Send,
{
    async fn execute(
        &self,
        principal: &Principal,
        input: &I,
        cache: CacheMode,
    ) -> Result<O, BackendError>;
}

/// A routable operation: a name for logs and metrics, a read/write kind,
/// and one executor per backend.
pub struct Operation<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    name: &'static str,
    kind: OperationKind,
    primary: Arc<dyn BackendExecutor<I, O>>,
    legacy: Arc<dyn BackendExecutor<I, O>>,
}

impl<I, O> Operation<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn read(
        name: &'static str,
        primary: Arc<dyn BackendExecutor<I, O>>,
        legacy: Arc<dyn BackendExecutor<I, O>>,
    ) -> Self {
        Operation {
            name,
            kind: OperationKind::Read,
            primary,
            legacy,
        }
    }

    pub fn write(
        name: &'static str,
        primary: Arc<dyn BackendExecutor<I, O>>,
        legacy: Arc<dyn BackendExecutor<I, O>>,
    ) -> Self {
        Operation {
            name,
            kind: OperationKind::Write,
            primary,
            legacy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub(crate) fn primary(&self) -> &dyn BackendExecutor<I, O> {
        self.primary.as_ref()
    }

    pub(crate) fn legacy(&self) -> &dyn BackendExecutor<I, O> {
        self.legacy.as_ref()
    }
}
