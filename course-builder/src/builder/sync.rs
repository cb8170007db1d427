//! Persistence synchronizer
//!
//! Turns the difference between two store snapshots into per-record order
//! updates, fires them as one group in the background and reports back.
//!
//! Known limitations:
//! - a failed batch is not rolled back locally and not retried; the user is
//!   told and has to redo the move
//! - batches of different moves are not sequenced against each other, so two
//!   quick moves can land out of order and leave the remote orders
//!   non-contiguous. Overlaps are only logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::cache::ViewCache;
use crate::api::operations::{Operation, OperationResult, Operations};
use crate::api::remote::RemoteStore;
use crate::config::SyncConfig;

use super::events::{BuilderEvent, Notice};
use super::store::EntityStore;

/// Outcome of one remote update batch
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub batch_id: Uuid,
    /// Dispatch sequence number, starting at 1
    pub sequence: u64,
    pub results: Vec<OperationResult>,
    pub duration_ms: u64,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn failures(&self) -> Vec<&OperationResult> {
        self.results.iter().filter(|r| r.is_error()).collect()
    }
}

/// Minimal set of updates turning `before` into `after`: sections whose
/// order changed, then materials whose order or section changed, each by id.
pub fn diff(before: &EntityStore, after: &EntityStore) -> Operations {
    let mut ops = Operations::new();

    for section in after.sections() {
        let changed = before
            .section(section.id)
            .is_some_and(|old| old.order != section.order);
        if changed {
            ops.add(Operation::section_order(section.id, section.order));
        }
    }

    for material in after.materials() {
        let Some(old) = before.material(material.id) else {
            continue;
        };
        let moved_section = old.section_id != material.section_id;
        if moved_section || old.order != material.order {
            ops.add(Operation::material_order(
                material.id,
                material.order,
                moved_section.then_some(material.section_id),
            ));
        }
    }

    ops
}

pub struct Synchronizer {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<ViewCache>,
    config: SyncConfig,
    events: Option<UnboundedSender<BuilderEvent>>,
    runtime: Option<Handle>,
    sequence: AtomicU64,
    in_flight: Arc<AtomicUsize>,
}

/// Counts one batch as in flight until dropped, however its task ends
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> (Self, usize) {
        let previous = counter.fetch_add(1, Ordering::SeqCst);
        (Self(Arc::clone(counter)), previous)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Synchronizer {
    /// Batches are spawned on the runtime current at construction, if any
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<ViewCache>, config: SyncConfig) -> Self {
        Self {
            remote,
            cache,
            config,
            events: None,
            runtime: Handle::try_current().ok(),
            sequence: AtomicU64::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Spawn batches on this runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Publish batch reports and failure notices on this channel
    pub fn with_events(mut self, events: UnboundedSender<BuilderEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Number of batches dispatched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Fire a batch in the background. Empty batches issue nothing.
    /// The returned handle may be awaited or dropped; the batch runs either way.
    /// Without a runtime nothing is issued and an error notice is raised.
    pub fn dispatch(self: &Arc<Self>, ops: Operations) -> Option<JoinHandle<SyncReport>> {
        if ops.is_empty() {
            log::debug!("No order changes to persist");
            return None;
        }

        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            log::error!(
                "No tokio runtime to persist {} update(s); remote order left unchanged",
                ops.len()
            );
            self.notify(Notice::error(format!(
                "Could not save the new order: {} update(s) were not sent. \
                 Reload to see the saved arrangement.",
                ops.len()
            )));
            return None;
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let batch_id = Uuid::new_v4();
        let (guard, overlapping) = InFlightGuard::enter(&self.in_flight);
        if overlapping > 0 && self.config.warn_on_overlap {
            log::warn!(
                "Batch {} (#{}) dispatched while {} earlier batch(es) are still in flight; \
                 remote order may diverge if they complete out of order",
                batch_id, sequence, overlapping
            );
        }

        let this = Arc::clone(self);
        Some(runtime.spawn(async move {
            let report = this.persist(batch_id, sequence, &ops).await;
            drop(guard);
            this.publish(&report);
            report
        }))
    }

    /// Issue the batch and wait for every update in it
    async fn persist(&self, batch_id: Uuid, sequence: u64, ops: &Operations) -> SyncReport {
        let start = Instant::now();
        log::info!("Batch {} (#{}) - issuing {} update(s)", batch_id, sequence, ops.len());

        let results = ops
            .execute(self.remote.as_ref(), self.config.max_in_flight)
            .await;
        let report = SyncReport {
            batch_id,
            sequence,
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if report.is_success() {
            self.cache.invalidate_all().await;
            log::info!(
                "Batch {} (#{}) - completed in {}ms",
                batch_id, sequence, report.duration_ms
            );
        } else {
            for failure in report.failures() {
                log::error!(
                    "Batch {} (#{}) - {} {} failed: {}",
                    batch_id,
                    sequence,
                    failure.operation.operation_type(),
                    failure.operation.target(),
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
            log::warn!(
                "Batch {} (#{}) - {} of {} update(s) failed; local order kept",
                batch_id,
                sequence,
                report.failures().len(),
                report.results.len()
            );
        }

        report
    }

    fn publish(&self, report: &SyncReport) {
        if !report.is_success() {
            self.notify(Notice::persistence_failure(report));
        }
        self.send(BuilderEvent::SyncFinished(report.clone()));
    }

    fn notify(&self, notice: Notice) {
        self.send(BuilderEvent::Notice(notice));
    }

    fn send(&self, event: BuilderEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
