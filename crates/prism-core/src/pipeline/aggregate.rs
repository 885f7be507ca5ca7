//! Failure aggregation.
//!
//! Each failure stream gets its own drain task. A drain logs every record as
//! it arrives and hands the collected records back when its stream closes.

use tokio::sync::mpsc;

use crate::types::Failure;

use super::sync::JoinGroup;

/// Drain `failures` until every sender is gone.
pub async fn drain_failures(
    stream: &'static str,
    mut failures: mpsc::UnboundedReceiver<Failure>,
) -> Vec<Failure> {
    let mut collected = Vec::new();
    while let Some(failure) = failures.recv().await {
        tracing::error!("{}", failure);
        collected.push(failure);
    }
    tracing::debug!("{} drain finished ({} failures)", stream, collected.len());
    collected
}

/// Spawn a drain for `failures` into `drains`.
pub fn spawn_drain(
    drains: &mut JoinGroup<Vec<Failure>>,
    stream: &'static str,
    failures: mpsc::UnboundedReceiver<Failure>,
) {
    drains.spawn(stream, drain_failures(stream, failures));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::channel::failure_channel;
    use crate::types::FailureKind;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_drains_run_independently() {
        let (load_tx, load_rx) = failure_channel();
        let (save_tx, save_rx) = failure_channel();
        let mut drains = JoinGroup::new();
        spawn_drain(&mut drains, "load-failures", load_rx);
        spawn_drain(&mut drains, "save-failures", save_rx);

        for name in ["x.jpg", "y.jpg"] {
            load_tx
                .send(Failure::load(
                    PathBuf::from(name),
                    PipelineError::FileNotFound(PathBuf::from(name)),
                ))
                .unwrap();
        }
        drop(load_tx);
        drop(save_tx);

        let results = drains.wait().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 2);
        assert!(results[0].iter().all(|f| f.kind == FailureKind::Load));
        assert!(results[1].is_empty());
    }

    #[tokio::test]
    async fn test_many_failures_never_block_sender() {
        let (tx, rx) = failure_channel();
        // Nobody is draining yet; sends must still complete.
        for i in 0..1000 {
            tx.send(Failure::save(
                PathBuf::from(format!("{i}.jpg")),
                PipelineError::FileNotFound(PathBuf::from("dir")),
            ))
            .unwrap();
        }
        drop(tx);
        assert_eq!(drain_failures("save-failures", rx).await.len(), 1000);
    }
}
