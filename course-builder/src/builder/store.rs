//! In-memory copy of one course's sections and materials
//!
//! Pure data. Nothing here validates ordering; the recalculator is the only
//! place that produces new orders.

use std::collections::BTreeMap;

use crate::api::models::{CourseId, Material, MaterialId, Section, SectionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStore {
    course_id: CourseId,
    sections: BTreeMap<SectionId, Section>,
    materials: BTreeMap<MaterialId, Material>,
}

impl EntityStore {
    pub fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            sections: BTreeMap::new(),
            materials: BTreeMap::new(),
        }
    }

    pub fn from_parts(course_id: CourseId, sections: Vec<Section>, materials: Vec<Material>) -> Self {
        let mut store = Self::new(course_id);
        store.replace_all(sections, materials);
        store
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// The course's sections, ascending by order
    pub fn sections_of(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.values().collect();
        sections.sort_by_key(|s| (s.order, s.id));
        sections
    }

    /// A section's materials, ascending by order
    pub fn materials_of(&self, section_id: SectionId) -> Vec<&Material> {
        let mut materials: Vec<&Material> = self
            .materials
            .values()
            .filter(|m| m.section_id == section_id)
            .collect();
        materials.sort_by_key(|m| (m.order, m.id));
        materials
    }

    pub fn replace_all(&mut self, sections: Vec<Section>, materials: Vec<Material>) {
        self.sections = sections.into_iter().map(|s| (s.id, s)).collect();
        self.materials = materials.into_iter().map(|m| (m.id, m)).collect();
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.get_mut(&id)
    }

    pub(crate) fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn material_count(&self, section_id: SectionId) -> usize {
        self.materials
            .values()
            .filter(|m| m.section_id == section_id)
            .count()
    }

    /// Order for a section appended at the end
    pub fn next_section_order(&self) -> u32 {
        self.sections.values().map(|s| s.order).max().unwrap_or(0) + 1
    }

    /// Order for a material appended at the end of a section
    pub fn next_material_order(&self, section_id: SectionId) -> u32 {
        self.materials
            .values()
            .filter(|m| m.section_id == section_id)
            .map(|m| m.order)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn insert_section(&mut self, section: Section) {
        self.sections.insert(section.id, section);
    }

    pub fn insert_material(&mut self, material: Material) {
        self.materials.insert(material.id, material);
    }

    /// Remove a section together with its materials
    pub fn remove_section(&mut self, id: SectionId) -> Option<(Section, Vec<Material>)> {
        let section = self.sections.remove(&id)?;
        let owned: Vec<MaterialId> = self
            .materials
            .values()
            .filter(|m| m.section_id == id)
            .map(|m| m.id)
            .collect();
        let removed = owned
            .into_iter()
            .filter_map(|mid| self.materials.remove(&mid))
            .collect();
        Some((section, removed))
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.remove(&id)
    }
}
