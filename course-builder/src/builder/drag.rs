//! Drag session state machine
//!
//! Tracks a single rearrangement gesture from begin to release. It is fed
//! abstract "begin / hover / release" events and knows nothing about the
//! input library that produced them.
//!
//! ```text
//! Idle --begin--> Active --release(valid target)--> Committing --finish--> Idle
//!                   |  \--release(none | self)------------------------> Idle
//!                   \--cancel-------------------------------------------> Idle
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::models::{MaterialId, SectionId};

use super::error::DragError;

/// Identity and kind of a dragged item or a drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRef {
    Section(SectionId),
    Material(MaterialId),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(id) => write!(f, "{}", id),
            Self::Material(id) => write!(f, "{}", id),
        }
    }
}

impl std::str::FromStr for ItemRef {
    type Err = anyhow::Error;

    /// Parses `section:ID` or `material:ID`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, id)) = s.split_once(':') else {
            anyhow::bail!("Expected 'section:ID' or 'material:ID', got '{}'", s);
        };
        let id: i64 = id
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid id in '{}'", s))?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "section" | "s" => Ok(Self::Section(SectionId(id))),
            "material" | "m" => Ok(Self::Material(MaterialId(id))),
            other => anyhow::bail!("Unknown item kind '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Active {
        moving: ItemRef,
        /// Current candidate drop target; informational only
        over: Option<ItemRef>,
    },
    Committing {
        moving: ItemRef,
        target: ItemRef,
    },
}

/// What a release turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// No target, or dropped onto itself. Session is back to Idle.
    Cancelled { moving: ItemRef },
    /// Session is Committing; the caller applies the move then calls `finish`.
    Commit { moving: ItemRef, target: ItemRef },
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// The item being dragged, if any
    pub fn moving(&self) -> Option<ItemRef> {
        match self.state {
            DragState::Idle => None,
            DragState::Active { moving, .. } | DragState::Committing { moving, .. } => Some(moving),
        }
    }

    pub fn begin(&mut self, item: ItemRef) -> Result<(), DragError> {
        if let Some(current) = self.moving() {
            return Err(DragError::SessionInProgress(current));
        }
        log::debug!("Drag started on {}", item);
        self.state = DragState::Active {
            moving: item,
            over: None,
        };
        Ok(())
    }

    /// Track the candidate target. Ignored unless Active.
    pub fn hover(&mut self, target: Option<ItemRef>) {
        if let DragState::Active { over, .. } = &mut self.state {
            *over = target;
        }
    }

    pub fn release(&mut self, target: Option<ItemRef>) -> Result<Release, DragError> {
        let DragState::Active { moving, .. } = self.state else {
            return Err(DragError::NoActiveSession);
        };

        match target {
            Some(target) if target != moving => {
                log::debug!("Drag of {} released onto {}", moving, target);
                self.state = DragState::Committing { moving, target };
                Ok(Release::Commit { moving, target })
            }
            _ => {
                log::debug!("Drag of {} released without a target", moving);
                self.state = DragState::Idle;
                Ok(Release::Cancelled { moving })
            }
        }
    }

    /// Abandon an Active session. Committing sessions cannot be cancelled.
    pub fn cancel(&mut self) -> Result<ItemRef, DragError> {
        match self.state {
            DragState::Active { moving, .. } => {
                log::debug!("Drag of {} cancelled", moving);
                self.state = DragState::Idle;
                Ok(moving)
            }
            DragState::Committing { moving, .. } => Err(DragError::SessionInProgress(moving)),
            DragState::Idle => Err(DragError::NoActiveSession),
        }
    }

    /// Close a Committing session once the move has been applied
    pub fn finish(&mut self) -> Result<(), DragError> {
        match self.state {
            DragState::Committing { .. } => {
                self.state = DragState::Idle;
                Ok(())
            }
            _ => Err(DragError::NotCommitting),
        }
    }
}
