use crate::core::production::batch::Batch;
use crate::core::types::BucketId;

/// Weight of a single unit, shared by every product
pub const DEFAULT_UNIT_WEIGHT: f64 = 1.5;

/// Packaging applied when a source does not specify one
pub const DEFAULT_PACKAGING: &str = "standard";

/// A factory turning its rate descriptor into batches
///
/// Production is a pure function of the descriptor: every call to
/// [`ProductionSource::produce`] returns the same batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionSource {
    bucket: BucketId,
    rate_multiplier: f64,
    base_rate: u64,
}

impl ProductionSource {
    pub fn new(bucket: impl Into<BucketId>, rate_multiplier: f64, base_rate: u64) -> Self {
        Self {
            bucket: bucket.into(),
            rate_multiplier,
            base_rate,
        }
    }

    pub fn bucket(&self) -> &BucketId {
        &self.bucket
    }

    pub fn rate_multiplier(&self) -> f64 {
        self.rate_multiplier
    }

    /// Units produced per run: `floor(base_rate * rate_multiplier)`
    pub fn units_per_run(&self) -> u64 {
        (self.base_rate as f64 * self.rate_multiplier).floor().max(0.0) as u64
    }

    pub fn produce(&self) -> Batch {
        let quantity = self.units_per_run();
        Batch::new(
            self.bucket.clone(),
            quantity,
            quantity as f64 * DEFAULT_UNIT_WEIGHT,
            DEFAULT_PACKAGING,
        )
    }
}
