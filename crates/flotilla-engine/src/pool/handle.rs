/// Generation-checked reference to an object leased from a [`Pool`](super::Pool).
///
/// Handles are plain `Copy` data; holding one does not keep the object alive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PoolHandle {
    pub(super) slot: u32,
    pub(super) generation: u32,
}

impl PoolHandle {
    /// Storage slot index. Stable for the lifetime of the lease.
    #[inline]
    pub fn slot(self) -> u32 {
        self.slot
    }
}
