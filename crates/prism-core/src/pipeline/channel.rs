//! Channels and the generic stage worker that connects them.
//!
//! Job channels are bounded: a full buffer suspends the sender, which is the
//! only backpressure in the pipeline. Failure channels are unbounded so that
//! reporting an error can never stall the stage that produced it.

use std::fmt::Display;
use std::future::Future;

use tokio::sync::mpsc;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, the sender waits. A slow stage therefore
/// throttles every stage upstream of it.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}

/// Create a failure side channel.
pub fn failure_channel<E>() -> (mpsc::UnboundedSender<E>, mpsc::UnboundedReceiver<E>) {
    mpsc::unbounded_channel()
}

/// A pipeline stage: one input stream, one output stream, one item at a time.
///
/// Items that fail go to a separate failure stream, so every input either
/// produces output or is reported. Running a stage consumes it. When the
/// input is exhausted the stage returns and drops its sender, which closes
/// the output for the next stage.
pub struct PipelineStage<I, O> {
    name: &'static str,
    input: mpsc::Receiver<I>,
    output: mpsc::Sender<O>,
}

impl<I, O> PipelineStage<I, O> {
    /// Create a new pipeline stage.
    pub fn new(name: &'static str, input: mpsc::Receiver<I>, output: mpsc::Sender<O>) -> Self {
        Self {
            name,
            input,
            output,
        }
    }

    /// Run a 1-to-1 stage whose function can fail.
    ///
    /// Errors go to `failures` instead of the output stream and processing
    /// continues with the next item.
    pub async fn run_fallible<F, Fut, E>(self, f: F, failures: mpsc::UnboundedSender<E>) -> usize
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<O, E>>,
        E: Display,
    {
        self.run_fan_out_fallible(
            |item| {
                let fut = f(item);
                async move { fut.await.map(|result| vec![result]) }
            },
            failures,
        )
        .await
    }

    /// Run a 1-to-N stage whose function can fail.
    ///
    /// An error replaces the whole expansion of that item on `failures`.
    pub async fn run_fan_out_fallible<F, Fut, E>(
        mut self,
        f: F,
        failures: mpsc::UnboundedSender<E>,
    ) -> usize
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<Vec<O>, E>>,
        E: Display,
    {
        let mut forwarded = 0;
        while let Some(item) = self.input.recv().await {
            match f(item).await {
                Ok(results) => {
                    for result in results {
                        if self.output.send(result).await.is_err() {
                            tracing::warn!("{} stage: downstream closed, stopping", self.name);
                            return forwarded;
                        }
                        forwarded += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!("{} stage: {}", self.name, e);
                    if failures.send(e).is_err() {
                        tracing::warn!("{} stage: failure stream closed", self.name);
                    }
                }
            }
        }
        tracing::debug!("{} stage finished ({} forwarded)", self.name, forwarded);
        forwarded
    }
}
