//! Remote store interface for course sections and materials
//!
//! Models, the `RemoteStore` trait with its HTTP client, the order-update
//! operations used by the synchronizer, and the cache of remote list views.

pub mod cache;
pub mod client;
pub mod models;
pub mod operations;
pub mod remote;

pub use cache::ViewCache;
pub use client::CourseClient;
pub use models::{
    CourseId, Material, MaterialDraft, MaterialId, MaterialType, NewMaterial, NewSection, Section,
    SectionId, SectionPatch,
};
pub use operations::{Operation, OperationResult, Operations};
pub use remote::RemoteStore;
