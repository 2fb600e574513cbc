use crate::core::types::BucketId;
use serde::{Deserialize, Serialize};

/// One production run of a single source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub bucket: BucketId,
    pub quantity: u64,
    pub weight: f64,
    pub packaging: String,
}

impl Batch {
    pub fn new(bucket: impl Into<BucketId>, quantity: u64, weight: f64, packaging: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            quantity,
            weight,
            packaging: packaging.into(),
        }
    }
}
