//! Course content builder
//!
//! The `CourseBuilder` owns the in-memory store of one course, the drag
//! session and the synchronizer. UI glue drives it with gesture events and
//! create/edit/delete actions, reads `snapshot()` for rendering and listens on
//! the event channel for additions, drag results, sync reports and notices.
//!
//! All local changes are applied synchronously (optimistic); remote order
//! updates run in the background.

pub mod drag;
pub mod error;
pub mod events;
pub mod recalc;
pub mod store;
pub mod sync;

pub use drag::{DragSession, DragState, ItemRef, Release};
pub use error::{ContiguityError, DragError};
pub use events::{BuilderEvent, DragOutcome, Notice, NoticeLevel};
pub use recalc::Move;
pub use store::EntityStore;
pub use sync::{SyncReport, Synchronizer};

use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::api::cache::ViewCache;
use crate::api::models::{
    CourseId, Material, MaterialDraft, MaterialId, NewMaterial, NewSection, Section, SectionId,
    SectionPatch,
};
use crate::api::remote::RemoteStore;
use crate::config::SyncConfig;

/// One section with its materials, both in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub section: Section,
    pub materials: Vec<Material>,
}

/// Ordered view of the whole course for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSnapshot {
    pub course_id: CourseId,
    pub sections: Vec<SectionView>,
}

/// Result of ending a drag session
#[derive(Debug)]
pub struct DragResult {
    pub outcome: DragOutcome,
    /// Background batch persisting the move, if anything changed
    pub pending: Option<JoinHandle<SyncReport>>,
}

pub struct CourseBuilder {
    store: EntityStore,
    session: DragSession,
    remote: Arc<dyn RemoteStore>,
    cache: Arc<ViewCache>,
    sync: Arc<Synchronizer>,
    events: UnboundedSender<BuilderEvent>,
}

impl CourseBuilder {
    /// Create a builder for an (as yet unloaded) course plus its event stream.
    /// Remote updates are spawned on the tokio runtime current at this call.
    pub fn new(
        course_id: CourseId,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> (Self, UnboundedReceiver<BuilderEvent>) {
        Self::build(course_id, remote, config, None)
    }

    /// Like `new`, for UI loops that run outside the runtime doing the I/O
    pub fn with_runtime(
        course_id: CourseId,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<BuilderEvent>) {
        Self::build(course_id, remote, config, Some(runtime))
    }

    fn build(
        course_id: CourseId,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
        runtime: Option<Handle>,
    ) -> (Self, UnboundedReceiver<BuilderEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let cache = Arc::new(ViewCache::new());
        let mut sync = Synchronizer::new(Arc::clone(&remote), Arc::clone(&cache), config)
            .with_events(events.clone());
        if let Some(runtime) = runtime {
            sync = sync.with_runtime(runtime);
        }
        let sync = Arc::new(sync);

        let builder = Self {
            store: EntityStore::new(course_id),
            session: DragSession::new(),
            remote,
            cache,
            sync,
            events,
        };
        (builder, receiver)
    }

    pub fn course_id(&self) -> CourseId {
        self.store.course_id()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }

    pub fn drag_state(&self) -> DragState {
        self.session.state()
    }

    /// Batches dispatched but not yet finished
    pub fn pending_batches(&self) -> usize {
        self.sync.in_flight()
    }

    /// Fetch sections and materials (through the view cache) and replace the store
    pub async fn load(&mut self) -> Result<()> {
        let course_id = self.course_id();
        let remote = self.remote.as_ref();
        let sections = self
            .cache
            .sections(remote, course_id)
            .await
            .with_context(|| format!("Failed to load sections of {}", course_id))?;

        let cache = &self.cache;
        let per_section = try_join_all(sections.iter().map(|s| async move {
            cache
                .materials(remote, s.id)
                .await
                .with_context(|| format!("Failed to load materials of {}", s.id))
        }))
        .await?;

        let materials: Vec<Material> = per_section.into_iter().flatten().collect();
        log::info!(
            "Loaded {} with {} section(s) and {} material(s)",
            course_id,
            sections.len(),
            materials.len()
        );
        self.store.replace_all(sections, materials);

        if let Err(e) = recalc::check_contiguity(&self.store) {
            log::warn!("Remote order of {} is not contiguous: {}", course_id, e);
        }
        Ok(())
    }

    /// Drop cached views and load again
    pub async fn reload(&mut self) -> Result<()> {
        self.cache.invalidate_all().await;
        self.load().await
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        let sections = self
            .store
            .sections_of()
            .into_iter()
            .map(|section| SectionView {
                section: section.clone(),
                materials: self
                    .store
                    .materials_of(section.id)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect();

        CourseSnapshot {
            course_id: self.course_id(),
            sections,
        }
    }

    // === Drag gestures ===

    pub fn begin_drag(&mut self, item: ItemRef) -> Result<(), DragError> {
        self.session.begin(item)?;
        self.emit(BuilderEvent::DragStarted(item));
        Ok(())
    }

    pub fn hover(&mut self, target: Option<ItemRef>) {
        self.session.hover(target);
    }

    pub fn cancel_drag(&mut self) -> Result<(), DragError> {
        let moving = self.session.cancel()?;
        self.emit(BuilderEvent::DragEnded {
            moving,
            outcome: DragOutcome::Cancelled,
        });
        Ok(())
    }

    /// Release the gesture. A valid move is applied to the store before this
    /// returns; its remote updates are dispatched in the background.
    pub fn end_drag(&mut self, target: Option<ItemRef>) -> Result<DragResult, DragError> {
        let (moving, outcome, pending) = match self.session.release(target)? {
            Release::Cancelled { moving } => (moving, DragOutcome::Cancelled, None),
            Release::Commit { moving, target } => {
                let recalculated = recalc::recalculate(&self.store, moving, target);
                // the session is over once the result is known; persistence runs detached
                self.session.finish()?;
                match recalculated {
                    Some((mv, next)) => {
                        log::debug!("Committing {} move of {}", mv.kind(), moving);
                        let (updates, pending) = self.commit(next);
                        (moving, DragOutcome::Committed { mv, updates }, pending)
                    }
                    None => {
                        log::debug!("Drop of {} onto {} is not a valid move", moving, target);
                        (moving, DragOutcome::NoOp, None)
                    }
                }
            }
        };

        self.emit(BuilderEvent::DragEnded { moving, outcome });
        Ok(DragResult { outcome, pending })
    }

    /// Move in one call: begin, release onto `target`
    pub fn move_item(&mut self, moving: ItemRef, target: ItemRef) -> Result<DragResult, DragError> {
        self.begin_drag(moving)?;
        self.end_drag(Some(target))
    }

    // === Create / edit / delete ===

    /// Append a section at the end of the course
    pub async fn add_section(&mut self, title: &str, description: Option<String>) -> Result<Section> {
        let new = NewSection {
            course_id: self.course_id(),
            title: title.to_string(),
            description,
            order: self.store.next_section_order(),
        };
        let created = self
            .remote
            .create_section(&new)
            .await
            .context("Failed to create section")?;

        self.store.insert_section(created.clone());
        self.cache.invalidate_all().await;
        self.emit(BuilderEvent::SectionAdded(created.clone()));
        Ok(created)
    }

    /// Append a material at the end of a section
    pub async fn add_material(&mut self, section_id: SectionId, draft: MaterialDraft) -> Result<Material> {
        if self.store.section(section_id).is_none() {
            anyhow::bail!("{} is not part of {}", section_id, self.course_id());
        }
        let draft = draft.normalized();
        let new = NewMaterial {
            section_id,
            course_id: self.course_id(),
            title: draft.title,
            description: draft.description,
            material_type: draft.material_type,
            url: draft.url,
            duration: draft.duration,
            is_required: draft.is_required,
            order: self.store.next_material_order(section_id),
        };
        let created = self
            .remote
            .create_material(&new)
            .await
            .context("Failed to create material")?;

        self.store.insert_material(created.clone());
        self.cache.invalidate_section(section_id).await;
        self.emit(BuilderEvent::MaterialAdded(created.clone()));
        Ok(created)
    }

    /// Change title/description; order is untouched
    pub async fn edit_section(&mut self, id: SectionId, patch: SectionPatch) -> Result<Section> {
        let Some(current) = self.store.section(id) else {
            anyhow::bail!("{} is not part of {}", id, self.course_id());
        };
        let order = current.order;
        let mut updated = self
            .remote
            .update_section(id, &patch)
            .await
            .with_context(|| format!("Failed to update {}", id))?;

        // the local order is authoritative until the next reload
        updated.order = order;
        self.store.insert_section(updated.clone());
        self.cache.invalidate_all().await;
        Ok(updated)
    }

    /// Change a material's content; order and section are untouched
    pub async fn edit_material(&mut self, id: MaterialId, draft: MaterialDraft) -> Result<Material> {
        let Some(current) = self.store.material(id) else {
            anyhow::bail!("{} is not part of {}", id, self.course_id());
        };
        let (order, section_id) = (current.order, current.section_id);
        let mut updated = self
            .remote
            .update_material(id, &draft.normalized())
            .await
            .with_context(|| format!("Failed to update {}", id))?;

        updated.order = order;
        updated.section_id = section_id;
        self.store.insert_material(updated.clone());
        self.cache.invalidate_section(section_id).await;
        Ok(updated)
    }

    /// Delete a section (and its materials), then close the gap it leaves
    pub async fn delete_section(&mut self, id: SectionId) -> Result<Option<JoinHandle<SyncReport>>> {
        if self.store.section(id).is_none() {
            anyhow::bail!("{} is not part of {}", id, self.course_id());
        }
        let deleted = self
            .remote
            .delete_section(id)
            .await
            .with_context(|| format!("Failed to delete {}", id))?;
        if !deleted {
            anyhow::bail!("Backend refused to delete {}", id);
        }

        self.store.remove_section(id);
        self.cache.invalidate_all().await;
        self.emit(BuilderEvent::SectionRemoved(id));

        let next = recalc::close_section_gap(&self.store);
        Ok(self.commit(next).1)
    }

    /// Delete a material, then close the gap in its section
    pub async fn delete_material(&mut self, id: MaterialId) -> Result<Option<JoinHandle<SyncReport>>> {
        let Some(section_id) = self.store.material(id).map(|m| m.section_id) else {
            anyhow::bail!("{} is not part of {}", id, self.course_id());
        };
        let deleted = self
            .remote
            .delete_material(id)
            .await
            .with_context(|| format!("Failed to delete {}", id))?;
        if !deleted {
            anyhow::bail!("Backend refused to delete {}", id);
        }

        self.store.remove_material(id);
        self.cache.invalidate_section(section_id).await;
        self.emit(BuilderEvent::MaterialRemoved(id));

        let next = recalc::close_material_gap(&self.store, section_id);
        Ok(self.commit(next).1)
    }

    /// Swap in a recalculated store and dispatch the resulting updates
    fn commit(&mut self, next: EntityStore) -> (usize, Option<JoinHandle<SyncReport>>) {
        let ops = sync::diff(&self.store, &next);
        self.store = next;

        if let Err(e) = recalc::check_contiguity(&self.store) {
            log::warn!("Order of {} is not contiguous after commit: {}", self.course_id(), e);
        }

        let updates = ops.len();
        (updates, self.sync.dispatch(ops))
    }

    fn emit(&self, event: BuilderEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Builder event dropped; no listener");
        }
    }
}
