//! Core data models for course sections and materials
//!
//! These mirror the remote store's JSON records (camelCase on the wire).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

/// Identifier of a section within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub i64);

/// Identifier of a material within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub i64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "course {}", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section {}", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material {}", self.0)
    }
}

/// Top-level ordered container of materials within a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 1-based position among the course's sections
    pub order: u32,
}

/// Kind of learning item. Closed set, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Video,
    Document,
    Pdf,
    Quiz,
    Assignment,
    Link,
}

impl MaterialType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Document => "document",
            Self::Pdf => "pdf",
            Self::Quiz => "quiz",
            Self::Assignment => "assignment",
            Self::Link => "link",
        }
    }

    /// Only videos carry a meaningful duration
    pub fn has_duration(&self) -> bool {
        matches!(self, Self::Video)
    }
}

impl std::str::FromStr for MaterialType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            "pdf" => Ok(Self::Pdf),
            "quiz" => Ok(Self::Quiz),
            "assignment" => Ok(Self::Assignment),
            "link" => Ok(Self::Link),
            other => anyhow::bail!("Unknown material type: '{}'", other),
        }
    }
}

/// A single learning item belonging to exactly one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    pub url: String,
    /// Seconds; only meaningful for videos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub is_required: bool,
    /// 1-based position within its section
    pub order: u32,
}

/// Payload for `POST /sections`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub course_id: CourseId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
}

/// Payload for `POST /materials`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub is_required: bool,
    pub order: u32,
}

/// User-editable fields of a material. Order and section are owned by the
/// ordering engine and are never part of an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub is_required: bool,
}

impl MaterialDraft {
    /// Drop the duration for anything that is not a video
    pub fn normalized(mut self) -> Self {
        if !self.material_type.has_duration() {
            self.duration = None;
        }
        self
    }
}

/// Body of `PATCH /sections/{id}` for an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    pub title: String,
    pub description: Option<String>,
}

/// Body of an order-only `PATCH /sections/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOrderPatch {
    pub order: u32,
}

/// Body of an order-only `PATCH /materials/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrderPatch {
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
}

/// Response body of the delete endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
