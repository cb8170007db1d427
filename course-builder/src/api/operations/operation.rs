//! Core Operation types for order updates against the remote store

use serde::{Deserialize, Serialize};

use crate::api::models::{MaterialId, SectionId};
use crate::api::remote::RemoteStore;

/// A single order update that can be executed against the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Move a section to a new position within its course
    UpdateSectionOrder {
        section_id: SectionId,
        order: u32,
    },
    /// Move a material to a new position, optionally into another section
    UpdateMaterialOrder {
        material_id: MaterialId,
        order: u32,
        /// Only set when the material changed section
        section_id: Option<SectionId>,
    },
}

/// Result of executing an Operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation that was executed
    pub operation: Operation,
    /// Whether the operation succeeded
    pub success: bool,
    /// Error message if operation failed
    pub error: Option<String>,
}

impl Operation {
    pub fn section_order(section_id: SectionId, order: u32) -> Self {
        Self::UpdateSectionOrder { section_id, order }
    }

    pub fn material_order(material_id: MaterialId, order: u32, section_id: Option<SectionId>) -> Self {
        Self::UpdateMaterialOrder {
            material_id,
            order,
            section_id,
        }
    }

    /// Human-readable target of the operation, e.g. "section 4"
    pub fn target(&self) -> String {
        match self {
            Self::UpdateSectionOrder { section_id, .. } => section_id.to_string(),
            Self::UpdateMaterialOrder { material_id, .. } => material_id.to_string(),
        }
    }

    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::UpdateSectionOrder { .. } => "update_section_order",
            Self::UpdateMaterialOrder { .. } => "update_material_order",
        }
    }

    /// Execute this operation individually. Never fails: the outcome is
    /// captured in the result.
    pub async fn execute(&self, remote: &dyn RemoteStore) -> OperationResult {
        let outcome = match *self {
            Self::UpdateSectionOrder { section_id, order } => remote
                .update_section_order(section_id, order)
                .await
                .map(|_| ()),
            Self::UpdateMaterialOrder {
                material_id,
                order,
                section_id,
            } => remote
                .update_material_order(material_id, order, section_id)
                .await
                .map(|_| ()),
        };

        match outcome {
            Ok(()) => OperationResult::success(*self),
            Err(e) => OperationResult::error(*self, format!("{:#}", e)),
        }
    }
}

impl OperationResult {
    pub fn success(operation: Operation) -> Self {
        Self {
            operation,
            success: true,
            error: None,
        }
    }

    pub fn error(operation: Operation, error: String) -> Self {
        Self {
            operation,
            success: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }
}
