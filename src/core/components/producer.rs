use crate::core::components::pacing::Pacer;
use crate::core::components::traits::{StepState, Worker, WorkerSummary};
use crate::core::production::{Batch, ProductionSource};
use crate::core::storage::{DepositOutcome, StorageBuffer};
use crate::core::types::BucketId;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Per-source production counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerSummary {
    pub source: BucketId,
    pub batches_stored: u64,
    pub batches_discarded: u64,
    pub units_stored: u64,
}

impl ProducerSummary {
    pub fn new(source: BucketId) -> Self {
        Self {
            source,
            batches_stored: 0,
            batches_discarded: 0,
            units_stored: 0,
        }
    }

    fn record(&mut self, outcome: DepositOutcome, quantity: u64) {
        match outcome {
            DepositOutcome::Stored { .. } => {
                self.batches_stored += 1;
                self.units_stored += quantity;
            }
            DepositOutcome::Discarded => self.batches_discarded += 1,
        }
    }
}

/// Factory loop feeding one source's batches into storage
#[derive(Debug)]
pub struct ProducerLoop {
    name: String,
    source: ProductionSource,
    pacer: Pacer,
    /// Batch still waiting for room when stepped
    pending: Option<Batch>,
    summary: ProducerSummary,
}

impl ProducerLoop {
    pub fn new(source: ProductionSource, pacer: Pacer) -> Self {
        Self {
            name: format!("Factory:{}", source.bucket()),
            summary: ProducerSummary::new(source.bucket().clone()),
            source,
            pacer,
            pending: None,
        }
    }
}

impl Worker for ProducerLoop {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, storage: &StorageBuffer) {
        info!("[{}] Started ({} units per run)", self.name, self.source.units_per_run());
        while !storage.is_finished() {
            let batch = self.source.produce();
            let quantity = batch.quantity;
            let outcome = storage.deposit(batch);
            self.summary.record(outcome, quantity);
            self.pacer.pause();
        }
        info!(
            "[{}] Stopped: {} batches stored, {} discarded",
            self.name, self.summary.batches_stored, self.summary.batches_discarded
        );
    }

    fn step(&mut self, storage: &StorageBuffer) -> StepState {
        if storage.is_finished() {
            if let Some(batch) = self.pending.take() {
                self.summary.record(DepositOutcome::Discarded, batch.quantity);
            }
            return StepState::Done;
        }

        let batch = self.pending.take().unwrap_or_else(|| self.source.produce());
        match storage.try_deposit(&batch) {
            Some(outcome) => {
                self.summary.record(outcome, batch.quantity);
                match outcome {
                    DepositOutcome::Stored { .. } => StepState::Active,
                    DepositOutcome::Discarded => StepState::Done,
                }
            }
            None => {
                debug!("[{}] Holding {} units until storage has room", self.name, batch.quantity);
                self.pending = Some(batch);
                StepState::Active
            }
        }
    }

    fn summary(&self) -> WorkerSummary {
        WorkerSummary::Producer(self.summary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn producer(name: &str, multiplier: f64) -> ProducerLoop {
        ProducerLoop::new(ProductionSource::new(name, multiplier, 50), Pacer::fixed(Duration::ZERO))
    }

    fn producer_summary(worker: &ProducerLoop) -> ProducerSummary {
        match worker.summary() {
            WorkerSummary::Producer(summary) => summary,
            WorkerSummary::Consumer(_) => panic!("expected a producer summary"),
        }
    }

    #[test]
    fn test_step_stores_one_batch() {
        let storage = StorageBuffer::new(1000, None);
        let mut worker = producer("a", 1.0);

        assert_eq!(worker.step(&storage), StepState::Active);
        assert_eq!(worker.step(&storage), StepState::Active);

        let summary = producer_summary(&worker);
        assert_eq!(summary.batches_stored, 2);
        assert_eq!(summary.units_stored, 100);
        assert_eq!(storage.current_total(), 100);
    }

    #[test]
    fn test_step_holds_batch_while_storage_is_full() {
        // 96 held, release level 95: a 50-unit batch overflows and must wait
        let storage = StorageBuffer::new(100, None);
        storage.deposit(Batch::new("x", 96, 0.0, "standard"));
        let mut worker = producer("a", 1.0);

        assert_eq!(worker.step(&storage), StepState::Active);
        assert_eq!(storage.current_total(), 96);
        assert!(worker.pending.is_some());

        storage.finish();
        assert_eq!(worker.step(&storage), StepState::Done);
        let summary = producer_summary(&worker);
        assert_eq!(summary.batches_stored, 0);
        assert_eq!(summary.batches_discarded, 1);
    }

    #[test]
    fn test_run_returns_immediately_when_finished() {
        let storage = StorageBuffer::new(1000, None);
        storage.finish();
        let mut worker = producer("b", 1.1);

        worker.run(&storage);
        assert_eq!(producer_summary(&worker).batches_stored, 0);
        assert_eq!(worker.name(), "Factory:b");
    }
}
