//! Configuration for warehouse simulation runs
//!
//! This module provides the startup constants of a run (production rates,
//! warehouse sizing, truck classes, drain limit) together with the settings
//! that control how the workers are executed.

use crate::core::execution::errors::ConfigError;
use crate::core::production::ProductionSource;
use serde::{Deserialize, Serialize};

pub const MIN_BASE_RATE: u64 = 50;
pub const MIN_CAPACITY_MULTIPLIER: f64 = 100.0;
pub const MIN_SOURCES: usize = 3;
pub const MIN_PULL_CAPACITY_CLASSES: usize = 2;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Single-threaded stepped execution - every worker makes one
    /// non-blocking attempt per cycle, in registration order
    Sequential,
    /// Parallel execution using a Rayon thread pool - one blocking worker per thread
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Rayon
    }
}

/// A factory: the bucket it fills and its production rate relative to the base rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub rate_multiplier: f64,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, rate_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            rate_multiplier,
        }
    }
}

/// Interpret the drain limit entered at startup
///
/// Any non-positive value means the run has no limit.
pub fn drain_limit_from_input(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|limit| *limit > 0)
}

/// Parse a drain limit typed by the user
pub fn parse_drain_limit(input: &str) -> Result<Option<u64>, ConfigError> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map(drain_limit_from_input)
        .map_err(|_| ConfigError::InvalidDrainLimit(trimmed.to_string()))
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Units per run of a source with multiplier 1.0
    pub base_rate: u64,
    /// Warehouse capacity as a multiple of the summed hourly production
    pub capacity_multiplier: f64,
    pub sources: Vec<SourceSpec>,
    /// One consumer loop per entry
    pub pull_capacities: Vec<u64>,
    /// Number of drains after which the run finishes; `None` runs forever
    pub drain_limit: Option<u64>,
    pub production_interval_ms: u64,
    pub drain_interval_ms: u64,
    /// Standard deviation of the Gaussian jitter added to every pause
    pub delay_jitter_ms: Option<f64>,
    pub random_seed: u64,
    pub concurrency_mode: ConcurrencyMode,
    /// Thread pool size, only relevant in Rayon mode; defaults to one thread per worker
    pub thread_pool_size: Option<usize>,
    /// Cycle budget, only relevant in Sequential mode
    pub max_cycles: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_rate: 50,
            capacity_multiplier: 100.0,
            sources: vec![
                SourceSpec::new("a", 1.0),
                SourceSpec::new("b", 1.1),
                SourceSpec::new("c", 1.2),
            ],
            pull_capacities: vec![500, 300],
            drain_limit: None,
            production_interval_ms: 100,
            drain_interval_ms: 100,
            delay_jitter_ms: None,
            random_seed: 42,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
            max_cycles: None,
        }
    }
}

impl SimulationConfig {
    /// Create the default configuration: sources a/b/c, trucks of 500 and 300, no drain limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the units per run of a source with multiplier 1.0
    ///
    /// # Arguments
    /// * `base_rate` - Base production rate, at least [`MIN_BASE_RATE`]
    pub fn with_base_rate(mut self, base_rate: u64) -> Self {
        self.base_rate = base_rate;
        self
    }

    /// Set the warehouse capacity as a multiple of the summed hourly production
    pub fn with_capacity_multiplier(mut self, multiplier: f64) -> Self {
        self.capacity_multiplier = multiplier;
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceSpec>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the truck classes; one consumer loop is started per entry
    pub fn with_pull_capacities(mut self, pull_capacities: Vec<u64>) -> Self {
        self.pull_capacities = pull_capacities;
        self
    }

    /// Set the number of drains after which the run finishes
    ///
    /// # Arguments
    /// * `drain_limit` - `None` (or `Some(0)`) keeps the run going until the process is stopped
    ///
    /// # Returns
    /// A new configuration with the specified drain limit
    pub fn with_drain_limit(mut self, drain_limit: Option<u64>) -> Self {
        self.drain_limit = drain_limit;
        self
    }

    /// Set both loop intervals
    pub fn with_intervals_ms(mut self, production: u64, drain: u64) -> Self {
        self.production_interval_ms = production;
        self.drain_interval_ms = drain;
        self
    }

    /// Add Gaussian jitter to every loop pause
    ///
    /// # Arguments
    /// * `std_dev_ms` - Standard deviation in milliseconds; `None` keeps the pauses fixed
    pub fn with_delay_jitter(mut self, std_dev_ms: Option<f64>) -> Self {
        self.delay_jitter_ms = std_dev_ms;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the concurrency mode for the simulation
    ///
    /// # Arguments
    /// * `mode` - The concurrency mode to use
    ///
    /// # Returns
    /// A new configuration with the specified concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon, and
    /// must cover one thread per worker
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Limit a sequential run to a number of cycles, finishing storage when it is reached
    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn production_sources(&self) -> Vec<ProductionSource> {
        self.sources
            .iter()
            .map(|spec| ProductionSource::new(spec.name.as_str(), spec.rate_multiplier, self.base_rate))
            .collect()
    }

    /// Units produced by all sources in one run each
    pub fn hourly_production(&self) -> u64 {
        self.production_sources().iter().map(ProductionSource::units_per_run).sum()
    }

    /// `floor(capacity_multiplier * hourly_production)`
    pub fn warehouse_capacity(&self) -> u64 {
        (self.capacity_multiplier * self.hourly_production() as f64).floor().max(0.0) as u64
    }

    /// One worker per source plus one per pull capacity
    pub fn worker_count(&self) -> usize {
        self.sources.len() + self.pull_capacities.len()
    }

    /// Check the configuration against the startup constraints
    ///
    /// # Returns
    /// The first violated constraint as a [`ConfigError`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_rate < MIN_BASE_RATE {
            return Err(ConfigError::BaseRateTooLow(self.base_rate));
        }

        if !(self.capacity_multiplier >= MIN_CAPACITY_MULTIPLIER) {
            return Err(ConfigError::CapacityMultiplierTooLow(self.capacity_multiplier));
        }

        if self.sources.len() < MIN_SOURCES {
            return Err(ConfigError::TooFewSources(self.sources.len()));
        }

        for (index, spec) in self.sources.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(ConfigError::EmptySourceName);
            }
            if !spec.rate_multiplier.is_finite() || spec.rate_multiplier <= 0.0 {
                return Err(ConfigError::InvalidRateMultiplier {
                    source: spec.name.clone(),
                    multiplier: spec.rate_multiplier,
                });
            }
            for other in &self.sources[..index] {
                if other.name == spec.name {
                    return Err(ConfigError::DuplicateSource(spec.name.clone()));
                }
                if other.rate_multiplier == spec.rate_multiplier {
                    return Err(ConfigError::DuplicateRateMultiplier(spec.rate_multiplier));
                }
            }
        }

        if self.pull_capacities.iter().any(|capacity| *capacity == 0) {
            return Err(ConfigError::ZeroPullCapacity);
        }
        let mut distinct = self.pull_capacities.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < MIN_PULL_CAPACITY_CLASSES {
            return Err(ConfigError::TooFewPullCapacities(distinct.len()));
        }

        if let Some(std_dev) = self.delay_jitter_ms {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(ConfigError::InvalidJitter(std_dev));
            }
        }

        if self.concurrency_mode == ConcurrencyMode::Rayon {
            if let Some(requested) = self.thread_pool_size {
                let required = self.worker_count();
                if requested < required {
                    return Err(ConfigError::ThreadPoolTooSmall { requested, required });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.base_rate, 50);
        assert_eq!(config.pull_capacities, vec![500, 300]);
        assert_eq!(config.drain_limit, None);
        assert_eq!(config.thread_pool_size, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_capacity() {
        let config = SimulationConfig::default();
        // 50 + 55 + 60 units per hour, times 100
        assert_eq!(config.hourly_production(), 165);
        assert_eq!(config.warehouse_capacity(), 16_500);
        assert_eq!(config.worker_count(), 5);
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::new()
            .with_concurrency(ConcurrencyMode::Sequential)
            .with_drain_limit(Some(4))
            .with_intervals_ms(5, 10)
            .with_max_cycles(Some(1_000))
            .with_thread_pool_size(8);

        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.drain_limit, Some(4));
        assert_eq!(config.production_interval_ms, 5);
        assert_eq!(config.drain_interval_ms, 10);
        assert_eq!(config.max_cycles, Some(1_000));
        assert_eq!(config.thread_pool_size, Some(8));
    }

    #[test]
    fn test_validation() {
        let config = SimulationConfig::default().with_base_rate(49);
        assert_eq!(config.validate(), Err(ConfigError::BaseRateTooLow(49)));

        let config = SimulationConfig::default().with_capacity_multiplier(99.5);
        assert_eq!(config.validate(), Err(ConfigError::CapacityMultiplierTooLow(99.5)));

        let config = SimulationConfig::default()
            .with_sources(vec![SourceSpec::new("a", 1.0), SourceSpec::new("b", 1.1)]);
        assert_eq!(config.validate(), Err(ConfigError::TooFewSources(2)));

        let config = SimulationConfig::default().with_sources(vec![
            SourceSpec::new("a", 1.0),
            SourceSpec::new("b", 1.1),
            SourceSpec::new("c", 1.1),
        ]);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateRateMultiplier(1.1)));

        let config = SimulationConfig::default().with_sources(vec![
            SourceSpec::new("a", 1.0),
            SourceSpec::new("b", 0.0),
            SourceSpec::new("c", 1.2),
        ]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRateMultiplier { .. })));

        let config = SimulationConfig::default().with_pull_capacities(vec![300, 300]);
        assert_eq!(config.validate(), Err(ConfigError::TooFewPullCapacities(1)));

        let config = SimulationConfig::default().with_pull_capacities(vec![300, 0]);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPullCapacity));

        let config = SimulationConfig::default().with_delay_jitter(Some(-2.0));
        assert_eq!(config.validate(), Err(ConfigError::InvalidJitter(-2.0)));
    }

    #[test]
    fn test_thread_pool_must_host_every_worker() {
        let config = SimulationConfig::default().with_thread_pool_size(4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ThreadPoolTooSmall { requested: 4, required: 5 })
        );

        let config = config.with_concurrency(ConcurrencyMode::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_drain_limit_input() {
        assert_eq!(drain_limit_from_input(-1), None);
        assert_eq!(drain_limit_from_input(0), None);
        assert_eq!(drain_limit_from_input(12), Some(12));

        assert_eq!(parse_drain_limit(" 7\n"), Ok(Some(7)));
        assert_eq!(parse_drain_limit("-1"), Ok(None));
        assert_eq!(
            parse_drain_limit("many"),
            Err(ConfigError::InvalidDrainLimit("many".to_string()))
        );
    }
}
