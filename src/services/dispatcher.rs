//! Delivery of best-effort side effects (notifications, audit entries).
//!
//! In queued mode effects are handed to a bounded channel drained by a
//! background worker, so the admin-facing response never waits on delivery.
//! Each effect is retried with backoff; a failure is logged and dropped and
//! never reaches the caller. A full or closed queue falls back to inline
//! delivery rather than losing the effect.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::{DispatchConfig, DispatchMode};
use crate::db::SideEffectSink;
use crate::models::{CreateAuditLog, NewNotification};
use crate::utils::{with_retry, RetryPolicy};

#[derive(Debug, Clone)]
pub enum SideEffect {
    Notification(NewNotification),
    Audit(CreateAuditLog),
}

impl SideEffect {
    fn kind(&self) -> &'static str {
        match self {
            SideEffect::Notification(_) => "notification",
            SideEffect::Audit(_) => "audit_log",
        }
    }
}

async fn deliver(sink: &dyn SideEffectSink, retry: &RetryPolicy, effect: &SideEffect) {
    let result = with_retry(retry, move || async move {
        match effect {
            SideEffect::Notification(notification) => sink.insert_notification(notification).await,
            SideEffect::Audit(entry) => sink.insert_audit_log(entry).await,
        }
    })
    .await;

    if let Err(e) = result {
        tracing::warn!(
            effect = effect.kind(),
            error = %e,
            "Side effect dropped after retries"
        );
    }
}

#[derive(Clone)]
pub struct SideEffectDispatcher {
    sink: Arc<dyn SideEffectSink>,
    retry: RetryPolicy,
    queue: Option<mpsc::Sender<SideEffect>>,
}

impl SideEffectDispatcher {
    /// Delivers every batch before `dispatch` returns.
    pub fn inline(sink: Arc<dyn SideEffectSink>, retry: RetryPolicy) -> Self {
        Self {
            sink,
            retry,
            queue: None,
        }
    }

    /// Spawns the background worker. It stops once every dispatcher clone is dropped.
    pub fn queued(sink: Arc<dyn SideEffectSink>, config: &DispatchConfig) -> (Self, DispatchWorker) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let retry = config.retry_policy();
        let concurrency = config.concurrency.max(1);

        let handle = tokio::spawn(run_worker(rx, sink.clone(), retry.clone(), concurrency));

        let dispatcher = Self {
            sink,
            retry,
            queue: Some(tx),
        };

        (dispatcher, DispatchWorker { handle })
    }

    pub fn from_config(
        sink: Arc<dyn SideEffectSink>,
        config: &DispatchConfig,
    ) -> (Self, Option<DispatchWorker>) {
        match config.mode {
            DispatchMode::Inline => (Self::inline(sink, config.retry_policy()), None),
            DispatchMode::Queued => {
                let (dispatcher, worker) = Self::queued(sink, config);
                (dispatcher, Some(worker))
            }
        }
    }

    pub async fn dispatch(&self, effects: Vec<SideEffect>) {
        let Some(queue) = &self.queue else {
            self.deliver_all(effects).await;
            return;
        };

        let mut overflow = Vec::new();
        for effect in effects {
            match queue.try_send(effect) {
                Ok(()) => {}
                Err(TrySendError::Full(effect)) | Err(TrySendError::Closed(effect)) => {
                    tracing::warn!(effect = effect.kind(), "Side-effect queue unavailable, delivering inline");
                    overflow.push(effect);
                }
            }
        }

        if !overflow.is_empty() {
            self.deliver_all(overflow).await;
        }
    }

    async fn deliver_all(&self, effects: Vec<SideEffect>) {
        let sink = self.sink.as_ref();
        join_all(effects.iter().map(|effect| deliver(sink, &self.retry, effect))).await;
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<SideEffect>,
    sink: Arc<dyn SideEffectSink>,
    retry: RetryPolicy,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(effect) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let sink = sink.clone();
        let retry = retry.clone();

        tokio::spawn(async move {
            deliver(sink.as_ref(), &retry, &effect).await;
            drop(permit);
        });
    }

    // All permits back means every in-flight delivery has finished.
    let _ = semaphore.acquire_many(concurrency as u32).await;
    tracing::info!("Side-effect worker drained");
}

pub struct DispatchWorker {
    handle: JoinHandle<()>,
}

impl DispatchWorker {
    /// Waits for queued effects to be delivered. Returns `false` on timeout.
    pub async fn drain(self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Side-effect worker panicked: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("Side-effect worker did not drain within {:?}", timeout);
                false
            }
        }
    }
}
