use thiserror::Error;

use crate::api::models::{CourseId, MaterialId, SectionId};

use super::drag::ItemRef;

/// Misuse of the drag session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("a drag session for {0} is already in progress")]
    SessionInProgress(ItemRef),
    #[error("no drag session is active")]
    NoActiveSession,
    #[error("drag session is not committing")]
    NotCommitting,
}

/// A container whose order indices are not exactly 1..N
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContiguityError {
    #[error("sections of {course} have orders {found:?}, expected 1..={expected}")]
    Sections {
        course: CourseId,
        found: Vec<u32>,
        expected: usize,
    },
    #[error("materials of {section} have orders {found:?}, expected 1..={expected}")]
    Materials {
        section: SectionId,
        found: Vec<u32>,
        expected: usize,
    },
    #[error("{material} points at missing {section}")]
    Orphan {
        material: MaterialId,
        section: SectionId,
    },
}
