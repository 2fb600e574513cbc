use serde::{Deserialize, Serialize};

/// Storage activity counters for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Number of batches merged into storage
    pub deposits_stored: u64,
    /// Number of batches dropped because storage was finished
    pub deposits_discarded: u64,
    /// Units merged into storage over the whole run
    pub units_deposited: u64,
    /// Highest total ever held
    pub peak_total: u64,
    /// Deposits that left the total above capacity
    pub over_capacity_deposits: u64,
}

impl StorageStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self {
            deposits_stored: 0,
            deposits_discarded: 0,
            units_deposited: 0,
            peak_total: 0,
            over_capacity_deposits: 0,
        }
    }

    /// Record a merged batch and the total it produced
    pub fn record_stored(&mut self, quantity: u64, new_total: u64, capacity: u64) {
        self.deposits_stored += 1;
        self.units_deposited += quantity;
        self.peak_total = self.peak_total.max(new_total);
        if new_total > capacity {
            self.over_capacity_deposits += 1;
        }
    }

    /// Record a dropped batch
    pub fn record_discarded(&mut self) {
        self.deposits_discarded += 1;
    }
}

impl Default for StorageStats {
    fn default() -> Self {
        Self::new()
    }
}
