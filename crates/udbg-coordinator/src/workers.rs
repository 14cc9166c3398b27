//! Worker registry
//!
//! The execution engine publishes which workers run each operator; the
//! coordinator enumerates them on demand when broadcasting commands.

use dashmap::DashMap;

/// Source of the current worker set per operator
#[cfg_attr(test, mockall::automock)]
pub trait WorkerRegistry: Send + Sync {
    /// Workers currently executing `operator_id`, possibly none
    fn worker_ids(&self, operator_id: &str) -> Vec<String>;
}

/// Concurrent in-memory worker table
#[derive(Debug, Default)]
pub struct WorkerTable {
    workers: DashMap<String, Vec<String>>,
}

impl WorkerTable {
    /// Create an empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the worker set of `operator_id`
    pub fn set_workers<I, S>(&self, operator_id: &str, workers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workers.insert(
            operator_id.to_string(),
            workers.into_iter().map(Into::into).collect(),
        );
    }

    /// Forget the workers of `operator_id`
    pub fn remove(&self, operator_id: &str) {
        self.workers.remove(operator_id);
    }
}

impl WorkerRegistry for WorkerTable {
    fn worker_ids(&self, operator_id: &str) -> Vec<String> {
        self.workers
            .get(operator_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
