//! Ordering engine for course sections and materials
//!
//! Keeps a local copy of a course's two-level hierarchy consistent while it is
//! rearranged, and persists every change to the remote course store.

pub mod api;
pub mod builder;
pub mod cli;
pub mod config;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{CourseClient, RemoteStore, ViewCache};
pub use builder::{BuilderEvent, CourseBuilder, CourseSnapshot, DragOutcome, ItemRef, Notice};
pub use config::Config;
