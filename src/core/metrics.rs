use crate::core::storage::StorageSnapshot;
use crate::core::types::BucketId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average shipment composition over a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentStats {
    pub drain_count: u64,
    /// Mean units per drain for each bucket, `None` when no drain happened
    pub average_by_bucket: Option<BTreeMap<BucketId, f64>>,
    /// Mean units per drain over all buckets, `None` when no drain happened
    pub average_units_per_drain: Option<f64>,
}

impl ShipmentStats {
    pub fn has_drains(&self) -> bool {
        self.drain_count > 0
    }

    /// Human-readable summary block, one line per entry
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.average_by_bucket {
            Some(averages) => {
                lines.push("Average load per drain:".to_string());
                for (bucket, average) in averages {
                    lines.push(format!("- {}: {:.2} units per drain", bucket, average));
                }
                if let Some(total) = self.average_units_per_drain {
                    lines.push(format!("- all products: {:.2} units per drain", total));
                }
            }
            None => lines.push("No drains occurred".to_string()),
        }
        lines.push(format!("Drains completed: {}", self.drain_count));
        lines
    }
}

/// Post-run statistics over storage's cumulative counters
pub struct StatsAggregator;

impl StatsAggregator {
    /// `average = cumulative_shipped[bucket] / drain_count` per bucket
    pub fn summarize(snapshot: &StorageSnapshot) -> ShipmentStats {
        Self::from_counters(&snapshot.cumulative_shipped, snapshot.drain_count)
    }

    pub fn from_counters(cumulative_shipped: &BTreeMap<BucketId, u64>, drain_count: u64) -> ShipmentStats {
        if drain_count == 0 {
            return ShipmentStats {
                drain_count,
                average_by_bucket: None,
                average_units_per_drain: None,
            };
        }

        let drains = drain_count as f64;
        let average_by_bucket: BTreeMap<BucketId, f64> = cumulative_shipped
            .iter()
            .map(|(bucket, units)| (bucket.clone(), *units as f64 / drains))
            .collect();
        let total: u64 = cumulative_shipped.values().sum();

        ShipmentStats {
            drain_count,
            average_by_bucket: Some(average_by_bucket),
            average_units_per_drain: Some(total as f64 / drains),
        }
    }
}
