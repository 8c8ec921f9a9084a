//! # Object Pool
//!
//! Grow-on-demand pool for objects that are frequently acquired and
//! released: projectiles, trail segments, impact bursts.
//!
//! The pool owns every object it ever creates, in slot storage. Callers
//! hold copyable [`PoolHandle`]s carrying a slot index and a generation;
//! a handle from an earlier occupancy of the slot misses its checks, so
//! double release and foreign release are safe no-ops by construction.
//!
//! # Thread Safety
//!
//! Not thread-safe. The frame loop is the only mutator.

use tracing::debug;

/// Handle to an object acquired from an [`ObjectPool`].
///
/// Copyable and cheap. A handle stays valid until the object is
/// released; after that every access and release through it is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Slot index in the pool.
    index: u32,
    /// Generation of the slot occupancy this handle refers to.
    generation: u32,
}

impl PoolHandle {
    /// Returns the slot index (for logs and diagnostics).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the occupancy generation (for logs and diagnostics).
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// One slot of pool storage.
struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

/// A reusable-object pool with pre-warming, on-demand growth, and safe
/// reclaim semantics.
///
/// Every object produced by the factory is, at any instant, either free
/// or active; total capacity never decreases except via
/// [`dispose`](ObjectPool::dispose).
///
/// # Example
///
/// ```
/// use starfall_core::ObjectPool;
///
/// let mut pool = ObjectPool::new(2, 1, || Vec::<u32>::new());
/// let handle = pool.acquire();
/// pool.get_mut(handle).unwrap().push(42);
/// assert!(pool.release(handle));
/// assert!(!pool.release(handle)); // double release: safe no-op
/// ```
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    factory: Box<dyn FnMut() -> T>,
    reset: Option<Box<dyn FnMut(&mut T)>>,
    capacity_increment: u32,
    active_count: usize,
}

impl<T> ObjectPool<T> {
    /// Creates a pool and synthesizes `initial_size` objects up front.
    ///
    /// `capacity_increment` is how many objects are synthesized when an
    /// acquire finds the free list empty; a zero increment is treated
    /// as one so `acquire` can never fail.
    pub fn new(
        initial_size: usize,
        capacity_increment: u32,
        factory: impl FnMut() -> T + 'static,
    ) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(initial_size),
            free: Vec::with_capacity(initial_size),
            factory: Box::new(factory),
            reset: None,
            capacity_increment,
            active_count: 0,
        };
        pool.grow(initial_size);
        pool
    }

    /// Sets the reset hook applied to each object on release, restoring
    /// it to default state before it returns to the free list.
    #[must_use]
    pub fn with_reset(mut self, reset: impl FnMut(&mut T) + 'static) -> Self {
        self.reset = Some(Box::new(reset));
        self
    }

    /// Number of free objects ready to be acquired.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.free.len()
    }

    /// Number of currently active (acquired, not yet released) objects.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total capacity ever synthesized (free + active).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Acquires an object, growing the pool if the free list is empty.
    ///
    /// Never fails and never blocks; when no object is free,
    /// `capacity_increment` new objects are synthesized first.
    pub fn acquire(&mut self) -> PoolHandle {
        if self.free.is_empty() {
            let increment = (self.capacity_increment as usize).max(1);
            self.grow(increment);
        }
        // grow() pushed at least one free index
        let index = self.free.pop().unwrap_or_default();
        let slot = &mut self.slots[index as usize];
        slot.active = true;
        self.active_count += 1;
        PoolHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Gets a reference to a live pooled object.
    ///
    /// Returns `None` for stale or foreign handles.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        (slot.active && slot.generation == handle.generation).then_some(&slot.value)
    }

    /// Gets a mutable reference to a live pooled object.
    ///
    /// Returns `None` for stale or foreign handles.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        (slot.active && slot.generation == handle.generation).then_some(&mut slot.value)
    }

    /// Releases an object back to the free list.
    ///
    /// A stale handle (double release) or a handle from another pool is
    /// a safe no-op returning `false`; the pool's internal lists are
    /// never corrupted by an invalid release. A live release runs the
    /// reset hook and bumps the slot generation, invalidating every
    /// outstanding copy of the handle.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            debug!(
                index = handle.index,
                generation = handle.generation,
                "release of foreign pool handle ignored"
            );
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            debug!(
                index = handle.index,
                generation = handle.generation,
                "release of stale pool handle ignored"
            );
            return false;
        }
        if let Some(reset) = self.reset.as_mut() {
            reset(&mut slot.value);
        }
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.active_count -= 1;
        self.free.push(handle.index);
        true
    }

    /// Disposes the pool, invoking `disposer` on every object ever
    /// created (free and active alike), then clearing all storage.
    ///
    /// Used to release resources the pool does not itself own, such as
    /// external rendering handles. After disposal the pool is empty;
    /// the next acquire synthesizes fresh objects.
    pub fn dispose(&mut self, mut disposer: impl FnMut(T)) {
        for slot in self.slots.drain(..) {
            disposer(slot.value);
        }
        self.free.clear();
        self.active_count = 0;
    }

    /// Iterates mutably over all active objects with their handles.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            slot.active.then_some((
                PoolHandle {
                    #[allow(clippy::cast_possible_truncation)]
                    index: index as u32,
                    generation: slot.generation,
                },
                &mut slot.value,
            ))
        })
    }

    /// Iterates over all active objects with their handles.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.active.then_some((
                PoolHandle {
                    #[allow(clippy::cast_possible_truncation)]
                    index: index as u32,
                    generation: slot.generation,
                },
                &slot.value,
            ))
        })
    }

    /// Synthesizes `count` new objects and appends them to the free list.
    fn grow(&mut self, count: usize) {
        for _ in 0..count {
            #[allow(clippy::cast_possible_truncation)]
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: (self.factory)(),
                generation: 0,
                active: false,
            });
            self.free.push(index);
        }
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("capacity", &self.slots.len())
            .field("available", &self.free.len())
            .field("active", &self.active_count)
            .finish_non_exhaustive()
    }
}
