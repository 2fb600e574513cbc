pub mod allocation;
pub mod buffer;
pub mod stats;

// Re-export commonly used types
pub use allocation::allocate;
pub use buffer::{DepositOutcome, DrainOutcome, StorageBuffer, StorageSnapshot, RELEASE_THRESHOLD};
pub use stats::StorageStats;
