//! Events and notices delivered to the UI glue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::models::{Material, MaterialId, Section, SectionId};

use super::drag::ItemRef;
use super::recalc::Move;
use super::sync::SyncReport;

#[derive(Debug, Clone)]
pub enum BuilderEvent {
    SectionAdded(Section),
    MaterialAdded(Material),
    SectionRemoved(SectionId),
    MaterialRemoved(MaterialId),
    DragStarted(ItemRef),
    DragEnded {
        moving: ItemRef,
        outcome: DragOutcome,
    },
    /// A remote update batch completed, successfully or not
    SyncFinished(SyncReport),
    /// Something the user should be told about
    Notice(Notice),
}

/// How a drag session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Released without a target, onto itself, or explicitly cancelled
    Cancelled,
    /// Released onto a target that does not form a valid move
    NoOp,
    /// Applied locally; `updates` remote updates were dispatched
    Committed { mv: Move, updates: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Notice for a batch in which at least one update failed
    pub fn persistence_failure(report: &SyncReport) -> Self {
        let failures = report.failures();
        let mut targets: Vec<String> = failures.iter().map(|r| r.operation.target()).collect();
        targets.truncate(5);
        let more = failures.len().saturating_sub(targets.len());
        let suffix = if more > 0 {
            format!(" and {} more", more)
        } else {
            String::new()
        };

        Self::error(format!(
            "Could not save the new order: {} of {} updates failed ({}{}). \
             The arrangement shown may differ from the saved one; reload and try again.",
            failures.len(),
            report.results.len(),
            targets.join(", "),
            suffix
        ))
    }
}
