use std::collections::VecDeque;
use std::fmt;

use super::PoolHandle;

/// Objects that can be returned to a pool and reused.
///
/// `recycle` must bring the object back to the state a freshly constructed
/// one would have.
pub trait Recycle {
    fn recycle(&mut self);
}

/// Pool sizing.
///
/// `max_size` bounds `active + available`; values below 1 are raised to 1.
/// `initial_size` objects are built up front and parked as available; it is
/// clamped to `max_size / 2`, the idle retention limit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PoolConfig {
    pub initial_size: usize,
    pub max_size: usize,
}

impl PoolConfig {
    #[inline]
    pub const fn new(initial_size: usize, max_size: usize) -> Self {
        Self { initial_size, max_size }
    }

    fn normalized(self) -> Self {
        let max_size = self.max_size.max(1);
        Self {
            initial_size: self.initial_size.min(max_size / 2),
            max_size,
        }
    }

    /// Maximum number of idle objects kept for reuse.
    #[inline]
    pub fn idle_limit(&self) -> usize {
        self.max_size / 2
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(16, 256)
    }
}

/// Snapshot of pool occupancy and lifetime counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PoolStats {
    pub active: usize,
    pub available: usize,
    pub max_size: usize,
    /// Objects built by the factory.
    pub created: u64,
    /// Active objects forcibly reclaimed by `acquire` at capacity.
    pub evicted: u64,
    /// Released objects dropped because the idle list was full.
    pub discarded: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SlotState {
    Active,
    Available,
    Vacant,
}

struct Slot<T> {
    value: Option<T>,
    generation: u32,
    state: SlotState,
}

/// Bounded recycling pool.
///
/// Storage is a slot vector that never exceeds `max_size` entries. `active`
/// keeps lease order (front = oldest) and doubles as the eviction queue;
/// `available` is a LIFO reuse stack. A slot is in at most one of the two.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    active: VecDeque<u32>,
    available: Vec<u32>,
    vacant: Vec<u32>,

    config: PoolConfig,
    factory: Box<dyn FnMut() -> T>,
    reset: Box<dyn FnMut(&mut T)>,

    created: u64,
    evicted: u64,
    discarded: u64,
    warned_eviction: bool,
}

impl<T> Pool<T> {
    /// Creates a pool, building `config.initial_size` objects eagerly.
    pub fn new(
        config: PoolConfig,
        factory: impl FnMut() -> T + 'static,
        reset: impl FnMut(&mut T) + 'static,
    ) -> Self {
        let config = config.normalized();
        let mut pool = Self {
            slots: Vec::with_capacity(config.max_size.min(1024)),
            active: VecDeque::with_capacity(config.max_size.min(1024)),
            available: Vec::with_capacity(config.idle_limit().min(1024)),
            vacant: Vec::new(),
            config,
            factory: Box::new(factory),
            reset: Box::new(reset),
            created: 0,
            evicted: 0,
            discarded: 0,
            warned_eviction: false,
        };

        for _ in 0..config.initial_size {
            let slot = pool.construct();
            pool.slots[slot as usize].state = SlotState::Available;
            pool.available.push(slot);
        }

        pool
    }

    /// Leases an object, evicting the oldest active one when at capacity.
    ///
    /// An evicted object is reset before it is handed out again and every
    /// handle to its previous lease goes stale.
    pub fn acquire(&mut self) -> PoolHandle {
        if let Some(handle) = self.try_acquire() {
            return handle;
        }

        let slot = match self.active.pop_front() {
            Some(oldest) => {
                self.evict(oldest);
                oldest
            }
            // `try_acquire` only fails with a full active list; kept total for safety.
            None => self.construct(),
        };
        self.activate(slot)
    }

    /// Leases an object without ever evicting. Returns `None` at capacity.
    pub fn try_acquire(&mut self) -> Option<PoolHandle> {
        let slot = if let Some(slot) = self.available.pop() {
            slot
        } else if self.active.len() < self.config.max_size {
            self.construct()
        } else {
            return None;
        };
        Some(self.activate(slot))
    }

    /// Returns an object to the pool.
    ///
    /// Stale or foreign handles are ignored, so double release is a no-op.
    /// Returns `true` when the handle was live.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        if let Some(pos) = self.active.iter().position(|&s| s == handle.slot) {
            self.active.remove(pos);
        }
        self.retire(handle.slot);
        true
    }

    /// Releases every active object, oldest first.
    pub fn release_all(&mut self) {
        while let Some(slot) = self.active.pop_front() {
            self.retire(slot);
        }
    }

    /// Runs `keep` on every active object in lease order and releases those
    /// for which it returns `false`. Survivors keep their relative order.
    ///
    /// Returns the number of released objects.
    pub fn retain_active(&mut self, mut keep: impl FnMut(&mut T) -> bool) -> usize {
        let mut released = 0;
        let mut i = 0;
        while i < self.active.len() {
            let slot = self.active[i];
            let alive = match self.slots[slot as usize].value.as_mut() {
                Some(value) => keep(value),
                None => false,
            };
            if alive {
                i += 1;
            } else {
                self.active.remove(i);
                self.retire(slot);
                released += 1;
            }
        }
        released
    }

    /// Returns `true` while `handle` refers to a current lease.
    #[inline]
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.slots.get(handle.slot as usize).is_some_and(|s| {
            s.state == SlotState::Active && s.generation == handle.generation
        })
    }

    #[inline]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        if !self.is_live(handle) {
            return None;
        }
        self.slots[handle.slot as usize].value.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        if !self.is_live(handle) {
            return None;
        }
        self.slots[handle.slot as usize].value.as_mut()
    }

    /// Active objects in lease order (oldest first). Does not allocate.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        self.active.iter().filter_map(move |&slot| {
            let entry = &self.slots[slot as usize];
            entry.value.as_ref().map(|value| {
                (PoolHandle { slot, generation: entry.generation }, value)
            })
        })
    }

    /// Calls `f` on every active object in lease order.
    pub fn for_each_active_mut(&mut self, mut f: impl FnMut(PoolHandle, &mut T)) {
        for &slot in &self.active {
            let entry = &mut self.slots[slot as usize];
            if let Some(value) = entry.value.as_mut() {
                f(PoolHandle { slot, generation: entry.generation }, value);
            }
        }
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    #[inline]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active.len(),
            available: self.available.len(),
            max_size: self.config.max_size,
            created: self.created,
            evicted: self.evicted,
            discarded: self.discarded,
        }
    }

    /// Cross-checks the bookkeeping: slot states against list membership,
    /// no slot listed twice, and the size bound.
    ///
    /// O(n); meant for tests and debugging.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = vec![false; self.slots.len()];
        let lists = [
            (self.active.iter().copied().collect::<Vec<_>>(), SlotState::Active),
            (self.available.clone(), SlotState::Available),
            (self.vacant.clone(), SlotState::Vacant),
        ];
        for (list, expected) in lists {
            for slot in list {
                let Some(entry) = self.slots.get(slot as usize) else {
                    return Err(format!("slot {slot} out of range"));
                };
                if std::mem::replace(&mut seen[slot as usize], true) {
                    return Err(format!("slot {slot} listed more than once"));
                }
                if entry.state != expected {
                    return Err(format!("slot {slot} is {:?}, listed as {expected:?}", entry.state));
                }
                if entry.value.is_some() == (expected == SlotState::Vacant) {
                    return Err(format!("slot {slot} value presence disagrees with {expected:?}"));
                }
            }
        }
        if let Some(lost) = seen.iter().position(|s| !s) {
            return Err(format!("slot {lost} is in no list"));
        }
        if self.active.len() + self.available.len() > self.config.max_size {
            return Err(format!(
                "{} active + {} available exceeds max {}",
                self.active.len(),
                self.available.len(),
                self.config.max_size
            ));
        }
        Ok(())
    }

    // ── private helpers ────────────────────────────────────────────────────

    /// Builds a new object into a vacant (or new) slot. Caller sets the state.
    fn construct(&mut self) -> u32 {
        let value = (self.factory)();
        self.created += 1;

        if let Some(slot) = self.vacant.pop() {
            self.slots[slot as usize].value = Some(value);
            return slot;
        }

        self.slots.push(Slot {
            value: Some(value),
            generation: 0,
            state: SlotState::Vacant,
        });
        (self.slots.len() - 1) as u32
    }

    fn activate(&mut self, slot: u32) -> PoolHandle {
        let entry = &mut self.slots[slot as usize];
        entry.state = SlotState::Active;
        self.active.push_back(slot);
        PoolHandle { slot, generation: entry.generation }
    }

    /// Invalidates outstanding handles of an active slot and resets its object.
    fn evict(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        if let Some(value) = entry.value.as_mut() {
            (self.reset)(value);
        }
        self.evicted += 1;

        if !self.warned_eviction {
            log::debug!(
                "pool at capacity ({}); evicting oldest active objects",
                self.config.max_size
            );
            self.warned_eviction = true;
        }
    }

    /// Moves a slot that was just unlinked from `active` to the idle stack,
    /// or drops its object when the idle stack is full.
    fn retire(&mut self, slot: u32) {
        let keep = self.available.len() < self.config.idle_limit();
        let entry = &mut self.slots[slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        if let Some(value) = entry.value.as_mut() {
            (self.reset)(value);
        }

        if keep {
            entry.state = SlotState::Available;
            self.available.push(slot);
        } else {
            entry.value = None;
            entry.state = SlotState::Vacant;
            self.vacant.push(slot);
            self.discarded += 1;
        }
    }
}

impl<T: Recycle + Default + 'static> Pool<T> {
    /// Pool over a [`Recycle`] type, built with `T::default`.
    pub fn recycling(config: PoolConfig) -> Self {
        Self::new(config, T::default, T::recycle)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Spark {
        serial: u32,
        dirty: bool,
    }

    impl Recycle for Spark {
        fn recycle(&mut self) {
            self.dirty = false;
        }
    }

    fn numbered_pool(config: PoolConfig) -> (Pool<Spark>, Rc<Cell<u32>>) {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let pool = Pool::new(
            config,
            move || {
                counter.set(counter.get() + 1);
                Spark { serial: counter.get(), dirty: false }
            },
            Spark::recycle,
        );
        (pool, built)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn initial_size_is_prebuilt_and_clamped() {
        let (pool, built) = numbered_pool(PoolConfig::new(100, 10));
        assert_eq!(built.get(), 5);
        assert_eq!(pool.available_len(), 5);
        assert_eq!(pool.active_len(), 0);
        pool.validate().unwrap();
    }

    #[test]
    fn zero_max_is_raised_to_one() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 0));
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(a.slot(), b.slot());
        assert!(!pool.is_live(a));
    }

    // ── acquire ───────────────────────────────────────────────────────────

    #[test]
    fn acquire_prefers_available_lifo() {
        let (mut pool, built) = numbered_pool(PoolConfig::new(0, 8));
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        let c = pool.acquire();
        assert_eq!(c.slot(), b.slot());
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn overflow_evicts_oldest_and_resets_it() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 3));
        let handles: Vec<_> = (0..3).map(|_| pool.acquire()).collect();
        for &h in &handles {
            pool.get_mut(h).unwrap().dirty = true;
        }
        let first_serial = pool.get(handles[0]).unwrap().serial;

        let extra = pool.acquire();
        assert_eq!(extra.slot(), handles[0].slot());
        let reused = pool.get(extra).unwrap();
        assert_eq!(reused.serial, first_serial);
        assert!(!reused.dirty);
        assert!(pool.get(handles[0]).is_none());
        assert!(pool.get(handles[1]).unwrap().dirty);
        assert_eq!(pool.stats().evicted, 1);
        pool.validate().unwrap();
    }

    #[test]
    fn try_acquire_refuses_at_capacity() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 2));
        assert!(pool.try_acquire().is_some());
        assert!(pool.try_acquire().is_some());
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.stats().evicted, 0);
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn double_release_is_noop() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 4));
        let h = pool.acquire();
        assert!(pool.release(h));
        assert!(!pool.release(h));
        assert_eq!(pool.available_len(), 1);
        pool.validate().unwrap();
    }

    #[test]
    fn release_of_released_then_reacquired_slot_is_stale() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 4));
        let old = pool.acquire();
        pool.release(old);
        let new = pool.acquire();
        assert_eq!(old.slot(), new.slot());
        assert!(!pool.release(old));
        assert!(pool.is_live(new));
    }

    #[test]
    fn idle_list_is_capped_at_half_max() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 8));
        for _ in 0..8 {
            pool.acquire();
        }
        pool.release_all();
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.available_len(), 4);
        assert_eq!(pool.stats().discarded, 4);
        pool.validate().unwrap();
    }

    #[test]
    fn discarded_slots_are_rebuilt_by_factory() {
        let (mut pool, built) = numbered_pool(PoolConfig::new(0, 2));
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available_len(), 1);
        pool.acquire();
        pool.acquire();
        assert_eq!(built.get(), 3);
        pool.validate().unwrap();
    }

    // ── iteration ─────────────────────────────────────────────────────────

    #[test]
    fn retain_active_keeps_order_of_survivors() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 8));
        for _ in 0..5 {
            pool.acquire();
        }
        let released = pool.retain_active(|s| s.serial % 2 == 1);
        assert_eq!(released, 2);
        let serials: Vec<u32> = pool.iter_active().map(|(_, s)| s.serial).collect();
        assert_eq!(serials, vec![1, 3, 5]);
        pool.validate().unwrap();
    }

    #[test]
    fn for_each_active_mut_visits_in_lease_order() {
        let (mut pool, _) = numbered_pool(PoolConfig::new(0, 8));
        for _ in 0..3 {
            pool.acquire();
        }
        let mut order = Vec::new();
        pool.for_each_active_mut(|_, s| {
            s.dirty = true;
            order.push(s.serial);
        });
        assert_eq!(order, vec![1, 2, 3]);
        assert!(pool.iter_active().all(|(_, s)| s.dirty));
    }

    #[test]
    fn recycling_constructor_uses_default() {
        let mut pool: Pool<Spark> = Pool::recycling(PoolConfig::new(2, 4));
        let h = pool.acquire();
        assert_eq!(pool.get(h).unwrap().serial, 0);
        assert_eq!(pool.stats().created, 2);
    }
}
