//! Test helpers: record builders and an in-memory remote store

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::models::{
    CourseId, Material, MaterialDraft, MaterialId, MaterialType, NewMaterial, NewSection, Section,
    SectionId, SectionPatch,
};
use crate::api::remote::RemoteStore;

pub const COURSE: CourseId = CourseId(1);

pub fn section(id: i64, order: u32) -> Section {
    Section {
        id: SectionId(id),
        course_id: COURSE,
        title: format!("Section {}", id),
        description: None,
        order,
    }
}

pub fn material(id: i64, section_id: i64, order: u32) -> Material {
    Material {
        id: MaterialId(id),
        section_id: SectionId(section_id),
        course_id: COURSE,
        title: format!("Material {}", id),
        description: None,
        material_type: MaterialType::Document,
        url: format!("https://example.org/materials/{}", id),
        duration: None,
        is_required: false,
        order,
    }
}

#[derive(Debug, Default)]
struct MockState {
    sections: BTreeMap<SectionId, Section>,
    materials: BTreeMap<MaterialId, Material>,
    next_id: i64,
    calls: Vec<String>,
    failing_sections: HashSet<SectionId>,
    failing_materials: HashSet<MaterialId>,
}

/// Remote store backed by in-memory maps. Records every call by operation
/// name and can be told to fail updates for specific records.
#[derive(Debug, Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
    delay: Mutex<Option<Duration>>,
}

impl MockRemote {
    pub fn with_course(sections: Vec<Section>, materials: Vec<Material>) -> Self {
        let next_id = sections
            .iter()
            .map(|s| s.id.0)
            .chain(materials.iter().map(|m| m.id.0))
            .max()
            .unwrap_or(0)
            + 1;
        let state = MockState {
            sections: sections.into_iter().map(|s| (s.id, s)).collect(),
            materials: materials.into_iter().map(|m| (m.id, m)).collect(),
            next_id,
            ..MockState::default()
        };
        Self {
            state: Mutex::new(state),
            delay: Mutex::new(None),
        }
    }

    pub fn fail_section(&self, id: SectionId) {
        self.state.lock().unwrap().failing_sections.insert(id);
    }

    pub fn fail_material(&self, id: MaterialId) {
        self.state.lock().unwrap().failing_materials.insert(id);
    }

    /// Make every order update sleep before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == name)
            .count()
    }

    pub fn remote_section(&self, id: SectionId) -> Option<Section> {
        self.state.lock().unwrap().sections.get(&id).cloned()
    }

    pub fn remote_material(&self, id: MaterialId) -> Option<Material> {
        self.state.lock().unwrap().materials.get(&id).cloned()
    }

    fn record(&self, name: &str) {
        self.state.lock().unwrap().calls.push(name.to_string());
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list_sections(&self, course_id: CourseId) -> Result<Vec<Section>> {
        self.record("list_sections");
        let state = self.state.lock().unwrap();
        Ok(state
            .sections
            .values()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_materials(&self, section_id: SectionId) -> Result<Vec<Material>> {
        self.record("list_materials");
        let state = self.state.lock().unwrap();
        Ok(state
            .materials
            .values()
            .filter(|m| m.section_id == section_id)
            .cloned()
            .collect())
    }

    async fn create_section(&self, new: &NewSection) -> Result<Section> {
        self.record("create_section");
        let mut state = self.state.lock().unwrap();
        let id = SectionId(state.next_id);
        state.next_id += 1;
        let created = Section {
            id,
            course_id: new.course_id,
            title: new.title.clone(),
            description: new.description.clone(),
            order: new.order,
        };
        state.sections.insert(id, created.clone());
        Ok(created)
    }

    async fn create_material(&self, new: &NewMaterial) -> Result<Material> {
        self.record("create_material");
        let mut state = self.state.lock().unwrap();
        let id = MaterialId(state.next_id);
        state.next_id += 1;
        let created = Material {
            id,
            section_id: new.section_id,
            course_id: new.course_id,
            title: new.title.clone(),
            description: new.description.clone(),
            material_type: new.material_type,
            url: new.url.clone(),
            duration: new.duration,
            is_required: new.is_required,
            order: new.order,
        };
        state.materials.insert(id, created.clone());
        Ok(created)
    }

    async fn update_section(&self, id: SectionId, patch: &SectionPatch) -> Result<Section> {
        self.record("update_section");
        let mut state = self.state.lock().unwrap();
        let Some(section) = state.sections.get_mut(&id) else {
            anyhow::bail!("{} not found", id);
        };
        section.title = patch.title.clone();
        section.description = patch.description.clone();
        Ok(section.clone())
    }

    async fn update_material(&self, id: MaterialId, draft: &MaterialDraft) -> Result<Material> {
        self.record("update_material");
        let mut state = self.state.lock().unwrap();
        let Some(material) = state.materials.get_mut(&id) else {
            anyhow::bail!("{} not found", id);
        };
        material.title = draft.title.clone();
        material.description = draft.description.clone();
        material.material_type = draft.material_type;
        material.url = draft.url.clone();
        material.duration = draft.duration;
        material.is_required = draft.is_required;
        Ok(material.clone())
    }

    async fn update_section_order(&self, id: SectionId, order: u32) -> Result<Section> {
        self.pause().await;
        self.record("update_section_order");
        let mut state = self.state.lock().unwrap();
        if state.failing_sections.contains(&id) {
            anyhow::bail!("PATCH sections/{} returned HTTP 500: boom", id.0);
        }
        let Some(section) = state.sections.get_mut(&id) else {
            anyhow::bail!("{} not found", id);
        };
        section.order = order;
        Ok(section.clone())
    }

    async fn update_material_order(
        &self,
        id: MaterialId,
        order: u32,
        section_id: Option<SectionId>,
    ) -> Result<Material> {
        self.pause().await;
        self.record("update_material_order");
        let mut state = self.state.lock().unwrap();
        if state.failing_materials.contains(&id) {
            anyhow::bail!("PATCH materials/{} returned HTTP 500: boom", id.0);
        }
        let Some(material) = state.materials.get_mut(&id) else {
            anyhow::bail!("{} not found", id);
        };
        material.order = order;
        if let Some(section_id) = section_id {
            material.section_id = section_id;
        }
        Ok(material.clone())
    }

    async fn delete_section(&self, id: SectionId) -> Result<bool> {
        self.record("delete_section");
        let mut state = self.state.lock().unwrap();
        let existed = state.sections.remove(&id).is_some();
        state.materials.retain(|_, m| m.section_id != id);
        Ok(existed)
    }

    async fn delete_material(&self, id: MaterialId) -> Result<bool> {
        self.record("delete_material");
        Ok(self.state.lock().unwrap().materials.remove(&id).is_some())
    }
}
