use crate::core::components::consumer::ConsumerSummary;
use crate::core::components::producer::ProducerSummary;
use crate::core::storage::StorageBuffer;
use serde::{Deserialize, Serialize};

/// Outcome of a single non-blocking worker step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// The worker wants to be stepped again
    Active,
    /// The worker has observed the end of the run
    Done,
}

/// What a worker did over the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerSummary {
    Producer(ProducerSummary),
    Consumer(ConsumerSummary),
}

/// A loop driving the shared storage
///
/// Workers are driven either by [`Worker::run`] on a dedicated thread, which
/// blocks inside storage until the run finishes, or by repeated calls to
/// [`Worker::step`] from a single-threaded scheduler, which never blocks.
pub trait Worker: Send {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Loop until storage is finished, pausing between iterations
    fn run(&mut self, storage: &StorageBuffer);

    /// Make one non-blocking attempt, without pausing
    fn step(&mut self, storage: &StorageBuffer) -> StepState;

    fn summary(&self) -> WorkerSummary;
}
