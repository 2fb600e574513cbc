//! Shared, capacity-bounded storage with a high-water-mark release policy.
//!
//! Producers deposit batches into named buckets and consumers drain fixed
//! pull capacities out of them. Draining only starts once the held total
//! reaches [`RELEASE_THRESHOLD`] of capacity, and a producer whose batch would
//! overflow capacity waits until the total is back at or under that mark.
//!
//! All state sits behind one mutex. Two condition variables carry the two
//! opposite wake-ups:
//!
//! - `room_available`: deposit waiters, woken by drains that bring the total
//!   down to the mark and by the finish transition
//! - `drain_eligible`: drain waiters, woken by deposits that reach the mark
//!   and by the finish transition
//!
//! Every waiter re-checks its own predicate after waking.
//!
//! A deposit only waits when it would overflow. Once the wait ends (or when no
//! overflow was detected in the first place) the batch is merged without a
//! second capacity check, so a batch larger than the remaining headroom can
//! leave the total above capacity. Such deposits are counted in
//! [`StorageStats::over_capacity_deposits`].

use crate::core::production::Batch;
use crate::core::storage::allocation::allocate;
use crate::core::storage::stats::StorageStats;
use crate::core::types::{Allocation, BucketId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Fraction of capacity at which draining becomes possible
pub const RELEASE_THRESHOLD: f64 = 0.95;

/// Result of a deposit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositOutcome {
    /// Batch merged; `new_total` is the total held right after the merge
    Stored { new_total: u64 },
    /// Storage was finished; the batch was dropped and nothing changed
    Discarded,
}

/// Result of a drain attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Units removed by this drain, possibly fewer than requested
    Shipped(Allocation),
    /// Storage was finished; the caller should stop draining
    Finished,
}

/// Consistent copy of the storage state taken under the lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    pub contents: BTreeMap<BucketId, u64>,
    pub current_total: u64,
    pub capacity: u64,
    pub cumulative_shipped: BTreeMap<BucketId, u64>,
    pub drain_count: u64,
    pub finished: bool,
    pub stats: StorageStats,
}

impl StorageSnapshot {
    /// Sum of all bucket quantities
    pub fn contents_sum(&self) -> u64 {
        self.contents.values().sum()
    }

    /// Units removed by drains over the whole run
    pub fn total_shipped(&self) -> u64 {
        self.cumulative_shipped.values().sum()
    }
}

/// State protected by the mutex.
#[derive(Debug, Default)]
struct State {
    contents: BTreeMap<BucketId, u64>,
    current_total: u64,
    cumulative_shipped: BTreeMap<BucketId, u64>,
    drain_count: u64,
    finished: bool,
    stats: StorageStats,
}

/// The warehouse shared by every producer and consumer
///
/// Safe to share across threads by reference or through `Arc<StorageBuffer>`.
#[derive(Debug)]
pub struct StorageBuffer {
    capacity: u64,
    drain_limit: Option<u64>,
    state: Mutex<State>,
    room_available: Condvar,
    drain_eligible: Condvar,
}

impl StorageBuffer {
    /// Create an empty buffer
    ///
    /// A `drain_limit` of `None` (or zero) runs without a limit: the buffer
    /// then only finishes through [`StorageBuffer::finish`].
    pub fn new(capacity: u64, drain_limit: Option<u64>) -> Self {
        Self {
            capacity,
            drain_limit: drain_limit.filter(|limit| *limit > 0),
            state: Mutex::new(State::default()),
            room_available: Condvar::new(),
            drain_eligible: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn drain_limit(&self) -> Option<u64> {
        self.drain_limit
    }

    /// Total at which draining becomes possible
    pub fn release_level(&self) -> f64 {
        self.capacity as f64 * RELEASE_THRESHOLD
    }

    /// Lock state, recovering from poisoning.
    ///
    /// State is only mutated in short, panic-free sections, so a poisoned
    /// guard still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn at_release_level(&self, st: &State) -> bool {
        st.current_total as f64 >= self.release_level()
    }

    fn has_room(&self, st: &State) -> bool {
        st.current_total as f64 <= self.release_level()
    }

    fn overflows(&self, st: &State, quantity: u64) -> bool {
        st.current_total.saturating_add(quantity) > self.capacity
    }

    /// Store a batch, waiting while it would overflow
    ///
    /// Returns [`DepositOutcome::Discarded`] when the buffer is finished
    /// before or while waiting.
    pub fn deposit(&self, batch: Batch) -> DepositOutcome {
        let mut st = self.lock();
        if st.finished {
            return self.discard(&mut st, &batch);
        }

        if self.overflows(&st, batch.quantity) {
            debug!(
                "[Warehouse] Deposit of {} '{}' would overflow ({}/{}) - waiting for room",
                batch.quantity, batch.bucket, st.current_total, self.capacity
            );
            st = self
                .room_available
                .wait_while(st, |s| !s.finished && !self.has_room(s))
                .unwrap_or_else(PoisonError::into_inner);
            if st.finished {
                return self.discard(&mut st, &batch);
            }
        }

        self.store(&mut st, &batch)
    }

    /// Non-blocking [`StorageBuffer::deposit`]
    ///
    /// Returns `None` where `deposit` would wait; the batch is left with the
    /// caller.
    pub fn try_deposit(&self, batch: &Batch) -> Option<DepositOutcome> {
        let mut st = self.lock();
        if st.finished {
            return Some(self.discard(&mut st, batch));
        }
        if self.overflows(&st, batch.quantity) && !self.has_room(&st) {
            return None;
        }
        Some(self.store(&mut st, batch))
    }

    /// Drain up to `pull_capacity` units, waiting until the release level
    /// is reached
    pub fn drain(&self, pull_capacity: u64) -> DrainOutcome {
        let mut st = self.lock();
        if !st.finished && !self.at_release_level(&st) {
            debug!(
                "[Warehouse] Drain of {} waiting for release level ({}/{:.0})",
                pull_capacity,
                st.current_total,
                self.release_level()
            );
        }
        st = self
            .drain_eligible
            .wait_while(st, |s| !s.finished && !self.at_release_level(s))
            .unwrap_or_else(PoisonError::into_inner);

        if st.finished {
            return DrainOutcome::Finished;
        }
        DrainOutcome::Shipped(self.ship(&mut st, pull_capacity))
    }

    /// Non-blocking [`StorageBuffer::drain`]
    ///
    /// Returns `None` while the total is under the release level.
    pub fn try_drain(&self, pull_capacity: u64) -> Option<DrainOutcome> {
        let mut st = self.lock();
        if st.finished {
            return Some(DrainOutcome::Finished);
        }
        if !self.at_release_level(&st) {
            return None;
        }
        Some(DrainOutcome::Shipped(self.ship(&mut st, pull_capacity)))
    }

    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    /// Mark the buffer finished and wake every waiter
    pub fn finish(&self) {
        let mut st = self.lock();
        self.mark_finished(&mut st);
    }

    pub fn drain_count(&self) -> u64 {
        self.lock().drain_count
    }

    pub fn current_total(&self) -> u64 {
        self.lock().current_total
    }

    pub fn snapshot(&self) -> StorageSnapshot {
        let st = self.lock();
        StorageSnapshot {
            contents: st.contents.clone(),
            current_total: st.current_total,
            capacity: self.capacity,
            cumulative_shipped: st.cumulative_shipped.clone(),
            drain_count: st.drain_count,
            finished: st.finished,
            stats: st.stats.clone(),
        }
    }

    fn discard(&self, st: &mut State, batch: &Batch) -> DepositOutcome {
        st.stats.record_discarded();
        warn!(
            "[Warehouse] Storage finished - discarded {} units of '{}'",
            batch.quantity, batch.bucket
        );
        DepositOutcome::Discarded
    }

    fn store(&self, st: &mut State, batch: &Batch) -> DepositOutcome {
        *st.contents.entry(batch.bucket.clone()).or_insert(0) += batch.quantity;
        st.current_total += batch.quantity;
        let new_total = st.current_total;
        st.stats.record_stored(batch.quantity, new_total, self.capacity);

        info!(
            "[Warehouse] Stored {} units of '{}' (total: {}/{})",
            batch.quantity, batch.bucket, new_total, self.capacity
        );
        if new_total > self.capacity {
            warn!(
                "[Warehouse] Total {} is above capacity {} after storing '{}'",
                new_total, self.capacity, batch.bucket
            );
        }

        if self.at_release_level(st) {
            self.drain_eligible.notify_all();
        }
        DepositOutcome::Stored { new_total }
    }

    fn ship(&self, st: &mut State, pull_capacity: u64) -> Allocation {
        debug!("[Warehouse] Contents before drain: {:?}", st.contents);

        let allocation = allocate(&st.contents, pull_capacity);
        for (bucket, units) in allocation.iter() {
            if let Some(held) = st.contents.get_mut(bucket) {
                *held -= units;
            }
            *st.cumulative_shipped.entry(bucket.clone()).or_insert(0) += units;
        }
        st.current_total -= allocation.total();
        st.drain_count += 1;

        info!(
            "[Warehouse] Drain #{} shipped {} units {} (total: {}/{})",
            st.drain_count,
            allocation.total(),
            allocation,
            st.current_total,
            self.capacity
        );

        if let Some(limit) = self.drain_limit {
            if st.drain_count >= limit {
                info!("[Warehouse] Drain limit {} reached - finishing", limit);
                self.mark_finished(st);
            }
        }
        if self.has_room(st) {
            self.room_available.notify_all();
        }

        allocation
    }

    fn mark_finished(&self, st: &mut State) {
        if !st.finished {
            st.finished = true;
            self.room_available.notify_all();
            self.drain_eligible.notify_all();
        }
    }
}
