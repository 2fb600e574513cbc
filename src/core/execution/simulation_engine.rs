use crate::core::components::{
    ConsumerLoop, ConsumerSummary, Pacer, ProducerLoop, ProducerSummary, StepState, Worker, WorkerSummary,
};
use crate::core::execution::config::{ConcurrencyMode, SimulationConfig};
use crate::core::execution::errors::SimulationError;
use crate::core::metrics::{ShipmentStats, StatsAggregator};
use crate::core::storage::{StorageBuffer, StorageSnapshot};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything known about a run once every worker has stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub storage: StorageSnapshot,
    pub shipments: ShipmentStats,
    pub producers: Vec<ProducerSummary>,
    pub consumers: Vec<ConsumerSummary>,
    /// Cycles executed, for sequential runs
    pub cycles: Option<u64>,
}

/// Wires sources, storage and trucks together and runs them
pub struct SimulationEngine {
    config: SimulationConfig,
    storage: StorageBuffer,
    /// Producers first, then consumers, in configuration order
    workers: Vec<Box<dyn Worker>>,
    /// Cleared once a worker reports `StepState::Done`; such workers are not stepped again
    active: Vec<bool>,
    current_cycle: u64,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let storage = StorageBuffer::new(config.warehouse_capacity(), config.drain_limit);
        let mut workers: Vec<Box<dyn Worker>> = Vec::with_capacity(config.worker_count());
        let mut seed = config.random_seed;
        for source in config.production_sources() {
            let pacer = Self::pacer(&config, config.production_interval_ms, seed);
            workers.push(Box::new(ProducerLoop::new(source, pacer)));
            seed = seed.wrapping_add(1);
        }
        for pull_capacity in &config.pull_capacities {
            let pacer = Self::pacer(&config, config.drain_interval_ms, seed);
            workers.push(Box::new(ConsumerLoop::new(*pull_capacity, pacer)));
            seed = seed.wrapping_add(1);
        }

        info!(
            "[Engine] Warehouse capacity {} (release at {:.0}), {} workers, drain limit {:?}",
            storage.capacity(),
            storage.release_level(),
            workers.len(),
            config.drain_limit
        );

        Ok(Self {
            config,
            storage,
            active: vec![true; workers.len()],
            workers,
            current_cycle: 0,
        })
    }

    fn pacer(config: &SimulationConfig, interval_ms: u64, seed: u64) -> Pacer {
        let interval = Duration::from_millis(interval_ms);
        match config.delay_jitter_ms {
            Some(std_dev) => Pacer::jittered(interval, std_dev, seed),
            None => Pacer::fixed(interval),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageBuffer {
        &self.storage
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    /// Workers that have not yet reported `StepState::Done` in sequential mode
    pub fn active_workers(&self) -> usize {
        self.active.iter().filter(|active| **active).count()
    }

    /// Run until storage is finished
    ///
    /// Without a drain limit (and, in sequential mode, without a cycle
    /// budget) this never returns.
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        match self.config.concurrency_mode {
            ConcurrencyMode::Rayon => self.run_parallel()?,
            ConcurrencyMode::Sequential => self.run_sequential(),
        }

        let report = self.report();
        info!(
            "[Engine] Simulation finished: {} drains, {} units shipped, {} units left in storage",
            report.storage.drain_count,
            report.storage.total_shipped(),
            report.storage.current_total
        );
        Ok(report)
    }

    /// One blocking worker per pool thread
    fn run_parallel(&mut self) -> Result<(), SimulationError> {
        let threads = self.config.thread_pool_size.unwrap_or(self.workers.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("warehouse-worker-{}", index))
            .build()
            .map_err(|err| SimulationError::ThreadPool(err.to_string()))?;

        let storage = &self.storage;
        let workers = &mut self.workers;
        pool.scope(move |scope| {
            for worker in workers {
                scope.spawn(move |_| worker.run(storage));
            }
        });
        Ok(())
    }

    fn run_sequential(&mut self) {
        while !self.storage.is_finished() {
            if self.config.max_cycles.map_or(false, |max| self.current_cycle >= max) {
                info!("[Engine] Cycle budget of {} reached - finishing", self.current_cycle);
                self.storage.finish();
                break;
            }
            if self.step() == 0 {
                info!("[Engine] Every worker stopped at cycle {}", self.current_cycle);
                break;
            }
        }

        // Let the remaining workers observe the finished storage
        self.step_active();
    }

    /// Execute one sequential cycle: every active worker makes one attempt, in order
    ///
    /// # Returns
    ///
    /// The number of workers still active after the cycle.
    pub fn step(&mut self) -> usize {
        self.current_cycle += 1;
        self.step_active()
    }

    fn step_active(&mut self) -> usize {
        let storage = &self.storage;
        for (worker, active) in self.workers.iter_mut().zip(self.active.iter_mut()) {
            if *active && worker.step(storage) == StepState::Done {
                debug!("[Engine] {} done", worker.name());
                *active = false;
            }
        }
        self.active_workers()
    }

    /// Snapshot the current state together with every worker's summary
    pub fn report(&self) -> SimulationReport {
        let storage = self.storage.snapshot();
        let shipments = StatsAggregator::summarize(&storage);

        let mut producers = Vec::new();
        let mut consumers = Vec::new();
        for worker in &self.workers {
            match worker.summary() {
                WorkerSummary::Producer(summary) => producers.push(summary),
                WorkerSummary::Consumer(summary) => consumers.push(summary),
            }
        }

        let cycles = match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => Some(self.current_cycle),
            ConcurrencyMode::Rayon => None,
        };

        SimulationReport {
            storage,
            shipments,
            producers,
            consumers,
            cycles,
        }
    }
}
