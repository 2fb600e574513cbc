use crate::core::types::{Allocation, BucketId};
use std::collections::BTreeMap;

/// Greedy pick plan for one drain
///
/// Buckets holding units are taken largest first; equal quantities are
/// broken by bucket name ascending so the plan is reproducible. Each bucket
/// gives `min(held, remaining)` until the pull capacity is used up or every
/// bucket has been visited. `contents` is not modified.
pub fn allocate(contents: &BTreeMap<BucketId, u64>, pull_capacity: u64) -> Allocation {
    let mut candidates: Vec<(&BucketId, u64)> = contents
        .iter()
        .filter(|(_, quantity)| **quantity > 0)
        .map(|(id, quantity)| (id, *quantity))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut allocation = Allocation::new();
    let mut remaining = pull_capacity;
    for (bucket, quantity) in candidates {
        if remaining == 0 {
            break;
        }
        let take = quantity.min(remaining);
        allocation.push(bucket.clone(), take);
        remaining -= take;
    }

    allocation
}
