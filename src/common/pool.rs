//! Generic growable object pool.
//!
//! Instances are never destroyed during play. The pool only tracks *membership*:
//! which handles are free and which are handed out. Activating or deactivating the
//! underlying object (visibility, collision layers, state enums) is the caller's job,
//! normally a single commit system per pool.
//!
//! ```text
//!   acquire_or_create ──► in_use ──► release ──► free ──► acquire_or_create
//!          │ (free empty)                                      ▲
//!          └──────── create() ─────────────────────────────────┘
//! ```

use std::collections::VecDeque;

/// What `acquire_or_create` handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired<T> {
    Reused(T),
    Created(T),
}

impl<T: Copy> Acquired<T> {
    #[inline]
    pub fn item(self) -> T {
        match self {
            Self::Reused(t) | Self::Created(t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    free: VecDeque<T>,
    in_use: Vec<T>,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self { free: VecDeque::new(), in_use: Vec::new() }
    }
}

impl<T: Copy + PartialEq> ObjectPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the free list with `count` freshly created instances.
    pub fn prewarm(&mut self, count: usize, mut create: impl FnMut() -> T) {
        self.free.reserve(count);
        for _ in 0..count {
            self.free.push_back(create());
        }
    }

    /// Hand out a free instance, or build a new one when the free list is empty.
    ///
    /// Never fails: an empty pool grows.
    pub fn acquire_or_create(&mut self, create: impl FnOnce() -> T) -> Acquired<T> {
        let acquired = match self.free.pop_front() {
            Some(item) => Acquired::Reused(item),
            None => Acquired::Created(create()),
        };
        self.in_use.push(acquired.item());
        acquired
    }

    /// Return an in-use instance. Returns `false` (and does nothing) if the item
    /// is not currently handed out, so a double release cannot duplicate it.
    pub fn release(&mut self, item: T) -> bool {
        let Some(idx) = self.in_use.iter().position(|x| *x == item) else {
            return false;
        };
        self.in_use.swap_remove(idx);
        self.free.push_back(item);
        true
    }

    /// Reclaim every in-use instance. Returns what was reclaimed so the caller
    /// can deactivate the underlying objects.
    pub fn release_all(&mut self) -> Vec<T> {
        let reclaimed: Vec<T> = self.in_use.drain(..).collect();
        self.free.extend(reclaimed.iter().copied());
        reclaimed
    }

    #[inline]
    pub fn is_in_use(&self, item: T) -> bool {
        self.in_use.contains(&item)
    }

    #[inline]
    pub fn in_use(&self) -> &[T] {
        &self.in_use
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn in_use_len(&self) -> usize {
        self.in_use.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_grows_on_acquire() {
        let mut next = 0u32;
        let mut pool = ObjectPool::new();

        let a = pool.acquire_or_create(|| {
            next += 1;
            next
        });
        assert_eq!(a, Acquired::Created(1));
        assert_eq!(pool.in_use_len(), 1);
        assert_eq!(pool.free_len(), 0);
    }

    #[test]
    fn released_items_are_reused_before_creating() {
        let mut pool = ObjectPool::new();
        pool.prewarm(2, {
            let mut n = 10u32;
            move || {
                n += 1;
                n
            }
        });

        let a = pool.acquire_or_create(|| unreachable!()).item();
        assert_eq!(a, 11);
        assert!(pool.release(a));

        let b = pool.acquire_or_create(|| unreachable!());
        assert!(matches!(b, Acquired::Reused(_)));
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let mut pool = ObjectPool::new();
        let a = pool.acquire_or_create(|| 7u32).item();

        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.in_use_len(), 0);
    }

    #[test]
    fn release_all_reclaims_everything_in_use() {
        let mut pool = ObjectPool::new();
        let mut n = 0u32;
        for _ in 0..4 {
            pool.acquire_or_create(|| {
                n += 1;
                n
            });
        }

        let mut reclaimed = pool.release_all();
        reclaimed.sort_unstable();
        assert_eq!(reclaimed, vec![1, 2, 3, 4]);
        assert_eq!(pool.in_use_len(), 0);
        assert_eq!(pool.free_len(), 4);

        // Everything goes back exactly once.
        assert!(pool.release_all().is_empty());
        assert_eq!(pool.free_len(), 4);
    }
}
