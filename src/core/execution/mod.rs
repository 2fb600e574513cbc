pub mod config;
pub mod errors;
pub mod simulation_engine;

// Re-export commonly used types
pub use config::{ConcurrencyMode, SimulationConfig, SourceSpec};
pub use errors::{ConfigError, SimulationError};
pub use simulation_engine::{SimulationEngine, SimulationReport};
