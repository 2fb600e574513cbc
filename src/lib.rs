pub mod core;

// Re-export commonly used types
pub use crate::core::execution::{ConcurrencyMode, SimulationConfig, SimulationEngine, SimulationReport};
pub use crate::core::production::{Batch, ProductionSource};
pub use crate::core::storage::{DepositOutcome, DrainOutcome, StorageBuffer};
pub use crate::core::types::{Allocation, BucketId};
