//! Generic object pool for transient combat entities.
//!
//! Slots are reused by index; every lease is identified by a
//! [`PoolHandle`] carrying the slot index and a generation counter. Releasing
//! a slot fully resets the pooled value and bumps the generation, so a stale
//! handle kept by a previous owner can never reach the next lease.
//!
//! Capacity is advisory: when every slot is leased, `acquire` grows the pool
//! instead of failing.

/// Contract for values stored in an [`ObjectPool`].
pub trait Poolable: Default {
    /// Arguments used to (re)initialize a slot on acquire.
    type Init;

    /// Activate and initialize from `init`.
    fn spawn(&mut self, init: Self::Init);

    /// Clear every piece of lease-owned state (timers, payloads, references).
    fn reset(&mut self);
}

/// Handle to a leased pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Lease generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    generation: u32,
    leased: bool,
}

/// Fixed-capacity-with-growth recycler.
#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    capacity: usize,
    grown: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create a pool pre-filled with `capacity` inactive values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                item: T::default(),
                generation: 0,
                leased: false,
            })
            .collect();
        Self {
            slots,
            capacity,
            grown: 0,
        }
    }

    /// Lease the first free slot, growing the pool when none is free.
    pub fn acquire(&mut self, init: T::Init) -> PoolHandle {
        let index = if let Some(index) = self.slots.iter().position(|slot| !slot.leased) {
            index
        } else {
            self.slots.push(Slot {
                item: T::default(),
                generation: 0,
                leased: false,
            });
            self.grown += 1;
            tracing::debug!(
                size = self.slots.len(),
                capacity = self.capacity,
                "Object pool grew past capacity"
            );
            self.slots.len() - 1
        };

        let slot = &mut self.slots[index];
        slot.leased = true;
        slot.item.spawn(init);

        PoolHandle {
            index: u32::try_from(index).unwrap_or(u32::MAX),
            generation: slot.generation,
        }
    }

    /// Return a lease to the pool.
    ///
    /// Returns the reset value when the handle was live, so the caller can
    /// detach it from collaborators (physics bodies). Releasing a stale or
    /// already-released handle is a no-op and returns `None`.
    pub fn release(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.live_slot_mut(handle)?;
        slot.leased = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.item.reset();
        Some(&mut slot.item)
    }

    /// Access a live lease.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.leased && slot.generation == handle.generation)
            .map(|slot| &slot.item)
    }

    /// Mutably access a live lease.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.live_slot_mut(handle).map(|slot| &mut slot.item)
    }

    /// Whether `handle` still refers to its original lease.
    #[must_use]
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate over every live lease.
    pub fn iter_leased(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.leased).map(|(index, slot)| {
            (
                PoolHandle {
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                    generation: slot.generation,
                },
                &slot.item,
            )
        })
    }

    /// Total number of slots (leased or free).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently leased.
    #[must_use]
    pub fn leased_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.leased).count()
    }

    /// Advisory capacity the pool was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many slots were added beyond the initial capacity.
    #[must_use]
    pub fn grown(&self) -> usize {
        self.grown
    }

    fn live_slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.leased && slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Token {
        owner: Option<&'static str>,
        ticks: u32,
    }

    impl Poolable for Token {
        type Init = &'static str;

        fn spawn(&mut self, init: Self::Init) {
            self.owner = Some(init);
        }

        fn reset(&mut self) {
            self.owner = None;
            self.ticks = 0;
        }
    }

    #[test]
    fn test_acquire_reuses_first_free_slot() {
        let mut pool: ObjectPool<Token> = ObjectPool::with_capacity(2);
        let a = pool.acquire("a");
        let _b = pool.acquire("b");
        pool.release(a);
        let c = pool.acquire("c");
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_grows_when_exhausted() {
        let mut pool: ObjectPool<Token> = ObjectPool::with_capacity(1);
        pool.acquire("a");
        pool.acquire("b");
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.grown(), 1);
        assert_eq!(pool.leased_count(), 2);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool: ObjectPool<Token> = ObjectPool::with_capacity(1);
        let a = pool.acquire("a");
        assert!(pool.release(a).is_some());
        assert!(pool.release(a).is_none());
        assert_eq!(pool.leased_count(), 0);
    }

    #[test]
    fn test_stale_handle_cannot_reach_new_lease() {
        let mut pool: ObjectPool<Token> = ObjectPool::with_capacity(1);
        let old = pool.acquire("first");
        pool.release(old);
        let new = pool.acquire("second");

        assert!(pool.get(old).is_none());
        assert!(pool.get_mut(old).is_none());
        assert!(pool.release(old).is_none());
        assert_eq!(pool.get(new).and_then(|t| t.owner), Some("second"));
    }

    #[test]
    fn test_release_resets_state() {
        let mut pool: ObjectPool<Token> = ObjectPool::with_capacity(1);
        let a = pool.acquire("a");
        pool.get_mut(a).unwrap().ticks = 9;
        let released = pool.release(a).unwrap();
        assert_eq!(released.ticks, 0);
        assert!(released.owner.is_none());
    }
}
