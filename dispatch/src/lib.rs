pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod invalidation;
pub mod metrics_defs;
pub mod observer;
pub mod operation;
pub mod principal;
pub mod types;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use errors::{BackendError, DispatchError};
pub use invalidation::{InvalidationStore, MemoryInvalidationStore};
pub use observer::{Attempt, MetricsObserver, NullObserver, Observer, TracingObserver};
pub use operation::{BackendExecutor, Operation};
pub use principal::{Credential, Principal};
pub use types::{Backend, CacheMode, Dispatched, OperationKind, ResourceClass, SubjectId};
