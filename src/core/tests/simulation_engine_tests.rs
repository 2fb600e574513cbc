// Tests for SimulationEngine functionality
#[cfg(test)]
mod tests {
    use crate::core::{
        execution::config::{ConcurrencyMode, SimulationConfig, SourceSpec},
        execution::errors::{ConfigError, SimulationError},
        execution::simulation_engine::SimulationEngine,
        types::BucketId,
    };

    fn sequential(drain_limit: Option<u64>) -> SimulationConfig {
        SimulationConfig::default()
            .with_concurrency(ConcurrencyMode::Sequential)
            .with_drain_limit(drain_limit)
    }

    #[test]
    fn test_sequential_run_is_deterministic() {
        // 165 units per cycle against a release level of 15675: the 500 truck
        // drains at cycles 95, 99 and 102, the 300 truck never gets a turn.
        let mut engine = SimulationEngine::new(sequential(Some(3))).unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.cycles, Some(102));
        assert_eq!(report.storage.drain_count, 3);
        assert!(report.storage.finished);
        assert_eq!(report.storage.cumulative_shipped[&BucketId::new("c")], 1000);
        assert_eq!(report.storage.cumulative_shipped[&BucketId::new("b")], 500);
        assert_eq!(report.storage.current_total, 15_330);

        let big_truck = &report.consumers[0];
        assert_eq!(big_truck.pull_capacity, 500);
        assert_eq!(big_truck.drains, 3);
        assert_eq!(report.consumers[1].drains, 0);
    }

    #[test]
    fn test_sequential_run_conserves_units() {
        let mut engine = SimulationEngine::new(sequential(Some(5))).unwrap();
        let report = engine.run().unwrap();

        let deposited: u64 = report.producers.iter().map(|p| p.units_stored).sum();
        assert_eq!(deposited, report.storage.stats.units_deposited);
        assert_eq!(deposited, report.storage.total_shipped() + report.storage.current_total);
        assert_eq!(report.storage.contents_sum(), report.storage.current_total);

        let drains: u64 = report.consumers.iter().map(|c| c.drains).sum();
        assert_eq!(drains, 5);
    }

    #[test]
    fn test_step_keeps_invariants() {
        let mut engine = SimulationEngine::new(sequential(Some(6))).unwrap();
        let mut previous = engine.storage().snapshot();

        while !engine.storage().is_finished() {
            engine.step();
            let snapshot = engine.storage().snapshot();

            assert_eq!(snapshot.contents_sum(), snapshot.current_total);
            assert!(snapshot.drain_count >= previous.drain_count);
            assert!(snapshot.drain_count <= previous.drain_count + 2);
            for (bucket, units) in &previous.cumulative_shipped {
                assert!(snapshot.cumulative_shipped[bucket] >= *units);
            }
            previous = snapshot;
        }

        assert_eq!(previous.drain_count, 6);
    }

    #[test]
    fn test_done_workers_are_not_stepped_again() {
        let mut engine = SimulationEngine::new(sequential(Some(3))).unwrap();
        assert_eq!(engine.active_workers(), 5);

        assert_eq!(engine.step(), 5);
        let report = engine.run().unwrap();
        assert_eq!(engine.active_workers(), 0);

        assert_eq!(engine.step(), 0);
        let after = engine.report();
        assert_eq!(after.producers, report.producers);
        assert_eq!(after.consumers, report.consumers);
        assert_eq!(after.storage, report.storage);
    }

    #[test]
    fn test_cycle_budget_finishes_unbounded_run() {
        let config = sequential(None).with_max_cycles(Some(50));
        let mut engine = SimulationEngine::new(config).unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.cycles, Some(50));
        assert!(report.storage.finished);
        assert_eq!(report.storage.drain_count, 0);
        assert!(!report.shipments.has_drains());
        assert_eq!(report.storage.current_total, 50 * 165);
    }

    #[test]
    fn test_parallel_run_stops_at_drain_limit() {
        let config = SimulationConfig::default()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_intervals_ms(1, 1)
            .with_drain_limit(Some(4));
        let mut engine = SimulationEngine::new(config).unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.cycles, None);
        assert!(report.storage.finished);
        assert_eq!(report.storage.drain_count, 4);
        assert_eq!(report.consumers.iter().map(|c| c.drains).sum::<u64>(), 4);
        assert_eq!(report.shipments.drain_count, 4);

        let stored: u64 = report.producers.iter().map(|p| p.units_stored).sum();
        assert_eq!(stored, report.storage.total_shipped() + report.storage.current_total);
        for consumer in &report.consumers {
            assert!(consumer.units_shipped <= consumer.drains * consumer.pull_capacity);
        }
    }

    #[test]
    fn test_parallel_run_with_jitter() {
        let config = SimulationConfig::default()
            .with_intervals_ms(1, 1)
            .with_delay_jitter(Some(0.5))
            .with_thread_pool_size(8)
            .with_drain_limit(Some(2));
        let mut engine = SimulationEngine::new(config).unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.storage.drain_count, 2);
        assert_eq!(report.storage.contents_sum(), report.storage.current_total);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig::default().with_sources(vec![
            SourceSpec::new("a", 1.0),
            SourceSpec::new("a", 1.1),
            SourceSpec::new("c", 1.2),
        ]);

        match SimulationEngine::new(config) {
            Err(SimulationError::Config(err)) => {
                assert_eq!(err, ConfigError::DuplicateSource("a".to_string()))
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("duplicate sources should be rejected"),
        }
    }
}
