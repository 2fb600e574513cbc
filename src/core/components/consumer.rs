use crate::core::components::pacing::Pacer;
use crate::core::components::traits::{StepState, Worker, WorkerSummary};
use crate::core::storage::{DrainOutcome, StorageBuffer};
use crate::core::types::{Allocation, BucketId};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One completed drain, as seen by the truck that made it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub consumer: String,
    pub pull_capacity: u64,
    pub allocation: Allocation,
}

impl Shipment {
    pub fn new(consumer: &str, pull_capacity: u64, allocation: Allocation) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            consumer: consumer.to_string(),
            pull_capacity,
            allocation,
        }
    }

    pub fn units(&self) -> u64 {
        self.allocation.total()
    }
}

/// Per-truck-class shipping counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSummary {
    pub name: String,
    pub pull_capacity: u64,
    pub drains: u64,
    pub units_shipped: u64,
    pub shipped_by_bucket: BTreeMap<BucketId, u64>,
}

impl ConsumerSummary {
    pub fn new(name: String, pull_capacity: u64) -> Self {
        Self {
            name,
            pull_capacity,
            drains: 0,
            units_shipped: 0,
            shipped_by_bucket: BTreeMap::new(),
        }
    }

    fn record(&mut self, shipment: &Shipment) {
        self.drains += 1;
        self.units_shipped += shipment.units();
        for (bucket, units) in shipment.allocation.iter() {
            *self.shipped_by_bucket.entry(bucket.clone()).or_insert(0) += units;
        }
    }

    /// Mean load of this truck class, `None` before its first drain
    pub fn average_load(&self) -> Option<f64> {
        (self.drains > 0).then(|| self.units_shipped as f64 / self.drains as f64)
    }
}

/// Truck loop draining a fixed pull capacity from storage
#[derive(Debug)]
pub struct ConsumerLoop {
    name: String,
    pull_capacity: u64,
    pacer: Pacer,
    summary: ConsumerSummary,
}

impl ConsumerLoop {
    pub fn new(pull_capacity: u64, pacer: Pacer) -> Self {
        let name = format!("Truck:{}", pull_capacity);
        Self {
            summary: ConsumerSummary::new(name.clone(), pull_capacity),
            name,
            pull_capacity,
            pacer,
        }
    }

    /// Record a drain result; `Done` once the truck should stop
    fn handle(&mut self, outcome: DrainOutcome) -> StepState {
        let allocation = match outcome {
            DrainOutcome::Shipped(allocation) if !allocation.is_empty() => allocation,
            _ => return StepState::Done,
        };

        let shipment = Shipment::new(&self.name, self.pull_capacity, allocation);
        info!(
            "[{}] Loaded shipment {}: {} ({} of {} units)",
            self.name,
            shipment.id,
            shipment.allocation,
            shipment.units(),
            self.pull_capacity
        );
        self.summary.record(&shipment);
        StepState::Active
    }
}

impl Worker for ConsumerLoop {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, storage: &StorageBuffer) {
        info!("[{}] Started", self.name);
        while !storage.is_finished() {
            let outcome = storage.drain(self.pull_capacity);
            if self.handle(outcome) == StepState::Done {
                break;
            }
            self.pacer.pause();
        }
        info!("[{}] Stopped after {} drains", self.name, self.summary.drains);
    }

    fn step(&mut self, storage: &StorageBuffer) -> StepState {
        match storage.try_drain(self.pull_capacity) {
            Some(outcome) => self.handle(outcome),
            None => StepState::Active,
        }
    }

    fn summary(&self) -> WorkerSummary {
        WorkerSummary::Consumer(self.summary.clone())
    }
}
