//! Counting join over named tasks.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::{PipelineError, PipelineResult};

/// A group of spawned tasks awaited together.
///
/// `wait` returns only once every task has finished, even if one of them
/// panicked, so no task outlives the group.
pub struct JoinGroup<T> {
    tasks: Vec<(&'static str, JoinHandle<T>)>,
}

impl<T> Default for JoinGroup<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T: Send + 'static> JoinGroup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the runtime and track it under `name`.
    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.tasks.push((name, tokio::spawn(task)));
    }

    /// Wait for all tasks, returning their outputs in spawn order.
    ///
    /// The first abnormal termination is reported after the rest have been
    /// awaited.
    pub async fn wait(self) -> PipelineResult<Vec<T>> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        let mut first_error = None;

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    tracing::error!("Task '{}' terminated abnormally: {}", name, e);
                    first_error.get_or_insert(PipelineError::StagePanicked {
                        stage: name.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outputs),
        }
    }
}
