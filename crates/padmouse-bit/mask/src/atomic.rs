use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bitmask::Bitmask;
use crate::Bitable;

/// A `Bitmask` that can be flipped from one thread and read from another.
///
/// Every operation is a single atomic instruction, so readers observe
/// either the old or the new value of a bit, never a torn word.
#[derive(Debug)]
pub struct AtomicBitmask<T: Bitable>(AtomicU64, PhantomData<T>);

impl<T: Bitable> AtomicBitmask<T> {
    pub fn new(values: &[T]) -> Self {
        Self(AtomicU64::new(Bitmask::new(values).bits()), PhantomData)
    }

    pub const fn empty() -> Self {
        Self(AtomicU64::new(0), PhantomData)
    }

    /// Snapshot the current value.
    #[inline]
    pub fn load(&self) -> Bitmask<T> {
        Bitmask::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, mask: Bitmask<T>) {
        self.0.store(mask.bits(), Ordering::Release);
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.load().contains(value)
    }

    /// Set or clear one bit, returning whether it was set before.
    #[inline]
    pub fn set(&self, value: T, on: bool) -> bool {
        let prev = if on {
            self.0.fetch_or(value.bit(), Ordering::AcqRel)
        } else {
            self.0.fetch_and(!value.bit(), Ordering::AcqRel)
        };
        prev & value.bit() != 0
    }

    #[inline]
    pub fn insert(&self, value: T) -> bool {
        !self.set(value, true)
    }

    #[inline]
    pub fn remove(&self, value: T) -> bool {
        self.set(value, false)
    }

    #[inline]
    pub fn is_superset(&self, other: &Bitmask<T>) -> bool {
        self.load().is_superset(other)
    }
}

impl<T: Bitable> Default for AtomicBitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::AtomicBitmask;
    use crate::{Bitable, Bitmask};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Pointer,
        Volume,
    }

    impl Bitable for Mode {
        const ALL: &'static [Self] = &[Mode::Pointer, Mode::Volume];

        fn bit(&self) -> u64 {
            1u64 << (*self as u64)
        }

        fn index(&self) -> u32 {
            *self as u32
        }
    }

    #[test]
    fn set_returns_previous_state() {
        let mask = AtomicBitmask::<Mode>::empty();
        assert!(!mask.set(Mode::Volume, true));
        assert!(mask.set(Mode::Volume, true));
        assert!(mask.set(Mode::Volume, false));
        assert!(!mask.contains(Mode::Volume));
    }

    #[test]
    fn flips_from_other_thread_are_visible() {
        let mask = Arc::new(AtomicBitmask::<Mode>::new(&[Mode::Pointer]));
        let writer = Arc::clone(&mask);
        thread::spawn(move || {
            writer.insert(Mode::Volume);
        })
        .join()
        .unwrap();
        assert!(mask.is_superset(&Bitmask::new(&[Mode::Pointer, Mode::Volume])));
    }
}
