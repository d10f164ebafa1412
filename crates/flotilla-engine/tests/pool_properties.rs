//! Property tests for the recycling pool.
//!
//! Random sequences of pool operations are replayed against a simple model
//! (live handles in lease order); the pool's bookkeeping and the model must
//! agree after every step.

use std::collections::VecDeque;

use flotilla_engine::pool::{Pool, PoolConfig, PoolHandle, Recycle};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Shard {
    lease: Option<u64>,
}

impl Recycle for Shard {
    fn recycle(&mut self) {
        self.lease = None;
    }
}

#[derive(Debug, Clone)]
enum PoolOp {
    Acquire,
    TryAcquire,
    Release(usize),
    ReleaseStale(usize),
    ReleaseAll,
    /// Releases every object whose lease number is divisible by the value.
    RetainNotDivisible(u64),
}

fn pool_op_strategy() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        4 => Just(PoolOp::Acquire),
        2 => Just(PoolOp::TryAcquire),
        3 => (0..64usize).prop_map(PoolOp::Release),
        1 => (0..64usize).prop_map(PoolOp::ReleaseStale),
        1 => Just(PoolOp::ReleaseAll),
        1 => (2..5u64).prop_map(PoolOp::RetainNotDivisible),
    ]
}

struct Model {
    live: VecDeque<(PoolHandle, u64)>,
    stale: Vec<PoolHandle>,
    next_lease: u64,
}

impl Model {
    fn lease(&mut self, pool: &mut Pool<Shard>, handle: PoolHandle) {
        let lease = self.next_lease;
        self.next_lease += 1;
        let shard = pool.get_mut(handle).expect("fresh handle is live");
        assert_eq!(shard.lease, None, "leased object was not reset");
        shard.lease = Some(lease);
        self.live.push_back((handle, lease));
    }
}

fn check(pool: &Pool<Shard>, model: &Model) -> Result<(), TestCaseError> {
    pool.validate().map_err(TestCaseError::fail)?;

    let config = pool.config();
    prop_assert!(pool.active_len() + pool.available_len() <= config.max_size);
    prop_assert!(pool.available_len() <= config.idle_limit());
    prop_assert_eq!(pool.active_len(), model.live.len());

    let order: Vec<u64> = pool
        .iter_active()
        .map(|(_, shard)| shard.lease.unwrap_or(u64::MAX))
        .collect();
    let expected: Vec<u64> = model.live.iter().map(|&(_, lease)| lease).collect();
    prop_assert_eq!(order, expected);

    for &(handle, lease) in &model.live {
        prop_assert_eq!(pool.get(handle).and_then(|s| s.lease), Some(lease));
    }
    for &handle in &model.stale {
        prop_assert!(pool.get(handle).is_none());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_invariants(
        initial in 0..12usize,
        max in 1..24usize,
        ops in prop::collection::vec(pool_op_strategy(), 1..80),
    ) {
        let mut pool = Pool::<Shard>::recycling(PoolConfig::new(initial, max));
        let mut model = Model { live: VecDeque::new(), stale: Vec::new(), next_lease: 0 };
        check(&pool, &model)?;

        for op in ops {
            match op {
                PoolOp::Acquire => {
                    let full = pool.active_len() == pool.config().max_size;
                    let handle = pool.acquire();
                    if full {
                        // The oldest lease is the one reclaimed.
                        let (oldest, _) = model.live.pop_front().expect("full pool has leases");
                        prop_assert_eq!(oldest.slot(), handle.slot());
                        model.stale.push(oldest);
                    }
                    model.lease(&mut pool, handle);
                }
                PoolOp::TryAcquire => {
                    let full = pool.active_len() == pool.config().max_size;
                    match pool.try_acquire() {
                        Some(handle) => {
                            prop_assert!(!full);
                            model.lease(&mut pool, handle);
                        }
                        None => prop_assert!(full),
                    }
                }
                PoolOp::Release(i) => {
                    if !model.live.is_empty() {
                        let (handle, _) = model.live.remove(i % model.live.len()).expect("index in range");
                        prop_assert!(pool.release(handle));
                        prop_assert!(!pool.release(handle), "double release must be a no-op");
                        model.stale.push(handle);
                    }
                }
                PoolOp::ReleaseStale(i) => {
                    if !model.stale.is_empty() {
                        let handle = model.stale[i % model.stale.len()];
                        let before = pool.stats();
                        prop_assert!(!pool.release(handle));
                        prop_assert_eq!(pool.stats(), before);
                    }
                }
                PoolOp::ReleaseAll => {
                    pool.release_all();
                    model.stale.extend(model.live.drain(..).map(|(h, _)| h));
                }
                PoolOp::RetainNotDivisible(d) => {
                    let released = pool.retain_active(|s| s.lease.is_some_and(|l| l % d != 0));
                    let (keep, drop): (VecDeque<_>, VecDeque<_>) =
                        model.live.drain(..).partition(|&(_, l)| l % d != 0);
                    prop_assert_eq!(released, drop.len());
                    model.live = keep;
                    model.stale.extend(drop.into_iter().map(|(h, _)| h));
                }
            }
            check(&pool, &model)?;
        }
    }

    #[test]
    fn filling_then_one_more_reuses_the_first(max in 1..32usize) {
        let mut pool = Pool::<Shard>::recycling(PoolConfig::new(0, max));
        let handles: Vec<_> = (0..max).map(|_| pool.acquire()).collect();
        for (i, &h) in handles.iter().enumerate() {
            pool.get_mut(h).expect("live").lease = Some(i as u64);
        }

        let extra = pool.acquire();
        prop_assert_eq!(extra.slot(), handles[0].slot());
        prop_assert_eq!(pool.get(extra).and_then(|s| s.lease), None);
        prop_assert!(pool.get(handles[0]).is_none());
        prop_assert_eq!(pool.stats().evicted, 1);
        prop_assert_eq!(pool.active_len(), max);
    }
}
