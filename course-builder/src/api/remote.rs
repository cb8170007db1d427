//! The remote store boundary
//!
//! Everything the ordering engine needs from the backend goes through this
//! trait, so the engine can run against the HTTP client or an in-memory fake.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    CourseId, Material, MaterialDraft, MaterialId, NewMaterial, NewSection, Section, SectionId,
    SectionPatch,
};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All sections of a course, in whatever order the backend returns them
    async fn list_sections(&self, course_id: CourseId) -> Result<Vec<Section>>;

    /// All materials of a section
    async fn list_materials(&self, section_id: SectionId) -> Result<Vec<Material>>;

    async fn create_section(&self, new: &NewSection) -> Result<Section>;

    async fn create_material(&self, new: &NewMaterial) -> Result<Material>;

    /// Edit title/description
    async fn update_section(&self, id: SectionId, patch: &SectionPatch) -> Result<Section>;

    /// Edit everything but order and section
    async fn update_material(&self, id: MaterialId, draft: &MaterialDraft) -> Result<Material>;

    async fn update_section_order(&self, id: SectionId, order: u32) -> Result<Section>;

    /// `section_id` is only sent when the material changed section
    async fn update_material_order(
        &self,
        id: MaterialId,
        order: u32,
        section_id: Option<SectionId>,
    ) -> Result<Material>;

    /// Cascades to the section's materials on the backend
    async fn delete_section(&self, id: SectionId) -> Result<bool>;

    async fn delete_material(&self, id: MaterialId) -> Result<bool>;
}
