//! Read-through cache of remote list views
//!
//! Holds the last fetched section list per course and material list per
//! section. The synchronizer invalidates everything after a fully successful
//! batch so the next read reflects the new arrangement.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::models::{CourseId, Material, Section, SectionId};
use super::remote::RemoteStore;

#[derive(Debug, Default)]
struct CachedViews {
    sections: HashMap<CourseId, Vec<Section>>,
    materials: HashMap<SectionId, Vec<Material>>,
}

#[derive(Debug, Default)]
pub struct ViewCache {
    views: RwLock<CachedViews>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

/// Counters for the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections of a course, fetched from the remote store on a miss
    pub async fn sections(&self, remote: &dyn RemoteStore, course_id: CourseId) -> Result<Vec<Section>> {
        if let Some(cached) = self.views.read().await.sections.get(&course_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = remote.list_sections(course_id).await?;
        self.views
            .write()
            .await
            .sections
            .insert(course_id, fetched.clone());
        Ok(fetched)
    }

    /// Materials of a section, fetched from the remote store on a miss
    pub async fn materials(&self, remote: &dyn RemoteStore, section_id: SectionId) -> Result<Vec<Material>> {
        if let Some(cached) = self.views.read().await.materials.get(&section_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = remote.list_materials(section_id).await?;
        self.views
            .write()
            .await
            .materials
            .insert(section_id, fetched.clone());
        Ok(fetched)
    }

    /// Drop one section's cached materials
    pub async fn invalidate_section(&self, section_id: SectionId) {
        self.views.write().await.materials.remove(&section_id);
    }

    /// Drop every cached view
    pub async fn invalidate_all(&self) {
        let mut views = self.views.write().await;
        let dropped = views.sections.len() + views.materials.len();
        views.sections.clear();
        views.materials.clear();
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        log::debug!("View cache invalidated ({} views dropped)", dropped);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}
