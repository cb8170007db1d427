//! Remote order-update operations
//!
//! A committed move is persisted as one group of per-record updates that
//! are issued together and awaited as a whole.

pub mod operation;
pub mod operations;

pub use operation::{Operation, OperationResult};
pub use operations::Operations;
