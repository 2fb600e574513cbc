/// Rejected simulation configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    BaseRateTooLow(u64),
    CapacityMultiplierTooLow(f64),
    TooFewSources(usize),
    EmptySourceName,
    DuplicateSource(String),
    InvalidRateMultiplier { source: String, multiplier: f64 },
    DuplicateRateMultiplier(f64),
    TooFewPullCapacities(usize),
    ZeroPullCapacity,
    InvalidJitter(f64),
    ThreadPoolTooSmall { requested: usize, required: usize },
    InvalidDrainLimit(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::BaseRateTooLow(rate) => write!(f, "base rate {} is below the minimum of 50", rate),
            ConfigError::CapacityMultiplierTooLow(m) => {
                write!(f, "capacity multiplier {} is below the minimum of 100", m)
            }
            ConfigError::TooFewSources(count) => write!(f, "{} sources configured, at least 3 required", count),
            ConfigError::EmptySourceName => write!(f, "source names must not be empty"),
            ConfigError::DuplicateSource(name) => write!(f, "source '{}' is configured twice", name),
            ConfigError::InvalidRateMultiplier { source, multiplier } => {
                write!(f, "source '{}' has invalid rate multiplier {}", source, multiplier)
            }
            ConfigError::DuplicateRateMultiplier(m) => write!(f, "rate multiplier {} is used by more than one source", m),
            ConfigError::TooFewPullCapacities(count) => {
                write!(f, "{} distinct pull capacities configured, at least 2 required", count)
            }
            ConfigError::ZeroPullCapacity => write!(f, "pull capacities must be greater than 0"),
            ConfigError::InvalidJitter(std_dev) => write!(f, "delay jitter {} must be finite and not negative", std_dev),
            ConfigError::ThreadPoolTooSmall { requested, required } => write!(
                f,
                "thread pool of {} threads cannot host {} blocking workers",
                requested, required
            ),
            ConfigError::InvalidDrainLimit(input) => write!(f, "'{}' is not a valid drain limit", input),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure to set up or run a simulation
#[derive(Debug)]
pub enum SimulationError {
    Config(ConfigError),
    ThreadPool(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "invalid configuration: {}", err),
            SimulationError::ThreadPool(msg) => write!(f, "failed to build worker thread pool: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::ThreadPool(_) => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}
