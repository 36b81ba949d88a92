//! Routing core. Each operation is tried against the primary backend
//! and, when the failure is transient and the fallback flag allows it,
//! retried against the legacy backend. Writes additionally keep the
//! invalidation registry coherent so later reads cannot serve stale
//! cached data.

use std::sync::Arc;
use std::time::Duration;

use shared::counter;
use tokio::time::Instant;

use crate::config::DispatchConfig;
use crate::errors::{BackendError, DispatchError};
use crate::invalidation::InvalidationStore;
use crate::metrics_defs;
use crate::observer::{Attempt, Observer};
use crate::operation::{BackendExecutor, Operation};
use crate::principal::Principal;
use crate::types::{Backend, CacheMode, Dispatched, OperationKind, ResourceClass};

pub struct Dispatcher {
    config: DispatchConfig,
    store: Arc<dyn InvalidationStore>,
    observers: Vec<Arc<dyn Observer>>,
}

impl Dispatcher {
    pub fn new(
        config: DispatchConfig,
        store: Arc<dyn InvalidationStore>,
        observers: Vec<Arc<dyn Observer>>,
    ) -> Self {
        Dispatcher {
            config,
            store,
            observers,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs one operation for one principal. The resource class scopes
    /// invalidation bookkeeping: reads of an invalidated (subject, class)
    /// pair bypass backend caches, and writes mark the pair before the
    /// response is returned.
    pub async fn execute<I, O>(
        &self,
        operation: &Operation<I, O>,
        principal: &Principal,
        class: &ResourceClass,
        input: &I,
    ) -> Result<Dispatched<O>, DispatchError>
    where
        I: Send + Sync + 'static,
        O: Send + 'static,
    {
        if principal.needs_refresh {
            return Err(DispatchError::NeedsRefresh);
        }
        if !self.config.primary_enabled && !self.config.fallback_enabled {
            return Err(DispatchError::AllBackendsDisabled {
                operation: operation.name(),
            });
        }

        match operation.kind() {
            OperationKind::Read => self.read(operation, principal, class, input).await,
            OperationKind::Write => self.write(operation, principal, class, input).await,
        }
    }

    async fn read<I, O>(
        &self,
        operation: &Operation<I, O>,
        principal: &Principal,
        class: &ResourceClass,
        input: &I,
    ) -> Result<Dispatched<O>, DispatchError>
    where
        I: Send + Sync + 'static,
        O: Send + 'static,
    {
        let started = Instant::now();
        let cache = if self.store.is_invalidated(&principal.subject, class) {
            CacheMode::Bypass
        } else {
            CacheMode::Allow
        };

        let mut primary_failure = None;
        if self.config.primary_enabled {
            let (duration, outcome) = self
                .attempt(
                    operation.name(),
                    Backend::Primary,
                    operation.primary(),
                    self.config.primary_timeout(),
                    principal,
                    input,
                    cache,
                )
                .await;
            match outcome {
                Ok(output) => {
                    self.finish_read(principal, class, cache, started);
                    return Ok(Dispatched {
                        output,
                        served_by: Backend::Primary,
                        duration,
                    });
                }
                Err(error) => {
                    if !self.config.fallback_enabled || !error.is_transient() {
                        return Err(DispatchError::Backend {
                            backend: Backend::Primary,
                            source: error,
                        });
                    }
                    tracing::info!(
                        operation = operation.name(),
                        subject = %principal.subject,
                        error = %error,
                        "primary read failed, falling back to legacy backend"
                    );
                    primary_failure = Some(error);
                }
            }
        }

        let (duration, outcome) = self
            .attempt(
                operation.name(),
                Backend::Legacy,
                operation.legacy(),
                self.config.legacy_timeout(),
                principal,
                input,
                cache,
            )
            .await;
        match outcome {
            Ok(output) => {
                if primary_failure.is_some() {
                    counter!(metrics_defs::FALLBACK_SERVED, "operation" => operation.name())
                        .increment(1);
                }
                self.finish_read(principal, class, cache, started);
                Ok(Dispatched {
                    output,
                    served_by: Backend::Legacy,
                    duration,
                })
            }
            Err(fallback) => match primary_failure {
                Some(primary) => Err(DispatchError::BothFailed { primary, fallback }),
                None => Err(DispatchError::Backend {
                    backend: Backend::Legacy,
                    source: fallback,
                }),
            },
        }
    }

    /// Writes run against exactly one backend. Retrying a write against
    /// the other backend could duplicate a side effect that already
    /// landed, so a failed write surfaces its error as-is.
    async fn write<I, O>(
        &self,
        operation: &Operation<I, O>,
        principal: &Principal,
        class: &ResourceClass,
        input: &I,
    ) -> Result<Dispatched<O>, DispatchError>
    where
        I: Send + Sync + 'static,
        O: Send + 'static,
    {
        let (backend, executor, limit) = if self.config.primary_enabled {
            (
                Backend::Primary,
                operation.primary(),
                self.config.primary_timeout(),
            )
        } else {
            (
                Backend::Legacy,
                operation.legacy(),
                self.config.legacy_timeout(),
            )
        };

        let (duration, outcome) = self
            .attempt(
                operation.name(),
                backend,
                executor,
                limit,
                principal,
                input,
                CacheMode::Bypass,
            )
            .await;
        match outcome {
            Ok(output) => {
                // The entry must exist before the caller sees the response,
                // otherwise a follow-up read could race it into a stale cache.
                self.store.mark_invalidated(&principal.subject, class);
                Ok(Dispatched {
                    output,
                    served_by: backend,
                    duration,
                })
            }
            Err(error) => Err(DispatchError::Backend {
                backend,
                source: error,
            }),
        }
    }

    fn finish_read(
        &self,
        principal: &Principal,
        class: &ResourceClass,
        cache: CacheMode,
        started: Instant,
    ) {
        if cache == CacheMode::Bypass {
            self.store.mark_fresh(&principal.subject, class, started);
        }
    }

    async fn attempt<I, O>(
        &self,
        operation: &'static str,
        backend: Backend,
        executor: &dyn BackendExecutor<I, O>,
        limit: Duration,
        principal: &Principal,
        input: &I,
        cache: CacheMode,
    ) -> (Duration, Result<O, BackendError>)
    where
        I: Send + Sync + 'static,
        O: Send + 'static,
    {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(limit, executor.execute(principal, input, cache))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Timeout),
        };
        let duration = started.elapsed();

        let attempt = Attempt {
            operation,
            backend,
            cache,
            duration,
            error: outcome.as_ref().err(),
        };
        for observer in &self.observers {
            observer.on_attempt(&attempt);
        }

        (duration, outcome)
    }
}
