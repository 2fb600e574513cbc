pub mod consumer;
pub mod pacing;
pub mod producer;
pub mod traits;

// Re-export commonly used types
pub use consumer::{ConsumerLoop, ConsumerSummary, Shipment};
pub use pacing::Pacer;
pub use producer::{ProducerLoop, ProducerSummary};
pub use traits::{StepState, Worker, WorkerSummary};
