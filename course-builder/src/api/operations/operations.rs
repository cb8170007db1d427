//! A group of order updates issued together

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use super::operation::{Operation, OperationResult};
use crate::api::remote::RemoteStore;

/// Ordered collection of operations belonging to one committed move
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operations {
    operations: Vec<Operation>,
}

impl Operations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Issue every operation at once (at most `max_in_flight` concurrently)
    /// and wait for the whole group. Results are returned in operation order.
    pub async fn execute(&self, remote: &dyn RemoteStore, max_in_flight: usize) -> Vec<OperationResult> {
        let pending: Vec<_> = self.operations.iter().map(|op| op.execute(remote)).collect();
        stream::iter(pending)
            .buffered(max_in_flight.max(1))
            .collect()
            .await
    }
}

impl From<Vec<Operation>> for Operations {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl IntoIterator for Operations {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Operations {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
