pub mod batch;
pub mod source;

// Re-export commonly used types
pub use batch::Batch;
pub use source::{ProductionSource, DEFAULT_PACKAGING, DEFAULT_UNIT_WEIGHT};
