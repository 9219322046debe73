use std::fmt;
use std::marker::PhantomData;

use crate::Bitable;

/// A set of `Bitable` values packed into a single word.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmask<T: Bitable>(u64, PhantomData<T>);

impl<T: Bitable> Bitmask<T> {
    /// Build a mask holding every value of the slice.
    pub fn new(values: &[T]) -> Self {
        values.iter().fold(Self::empty(), |mut acc, v| {
            acc.insert(*v);
            acc
        })
    }

    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Mask with every variant of `T` set.
    pub fn all() -> Self {
        Self::new(T::ALL)
    }

    /// Wrap a raw word. Bits that no variant owns are kept as is.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits, PhantomData)
    }

    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.0 & value.bit() != 0
    }

    /// Insert a value, returning `true` when it was not present before.
    #[inline]
    pub fn insert(&mut self, value: T) -> bool {
        let had = self.contains(value);
        self.0 |= value.bit();
        !had
    }

    /// Remove a value, returning `true` when it was present.
    #[inline]
    pub fn remove(&mut self, value: T) -> bool {
        let had = self.contains(value);
        self.0 &= !value.bit();
        had
    }

    #[inline]
    pub fn set(&mut self, value: T, on: bool) {
        if on {
            self.insert(value);
        } else {
            self.remove(value);
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0, PhantomData)
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0, PhantomData)
    }

    #[inline]
    pub const fn is_subset(&self, other: &Self) -> bool {
        self.0 & other.0 == self.0
    }

    #[inline]
    pub const fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate the contained values in bit order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            mask: *self,
            pos: 0,
        }
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for v in iter {
            mask.insert(v);
        }
        mask
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<T: Bitable> {
    mask: Bitmask<T>,
    pos: usize,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(value) = T::ALL.get(self.pos) {
            self.pos += 1;
            if self.mask.contains(*value) {
                return Some(*value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmask;
    use crate::Bitable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Flag {
        A,
        B,
        C,
        D,
    }

    impl Bitable for Flag {
        const ALL: &'static [Self] = &[Flag::A, Flag::B, Flag::C, Flag::D];

        fn bit(&self) -> u64 {
            1u64 << (*self as u64)
        }

        fn index(&self) -> u32 {
            *self as u32
        }
    }

    #[test]
    fn empty_mask_contains_nothing() {
        let mask = Bitmask::<Flag>::empty();
        assert!(mask.is_empty());
        assert!(Flag::ALL.iter().all(|f| !mask.contains(*f)));
    }

    #[test]
    fn insert_reports_whether_value_was_new() {
        let mut mask = Bitmask::empty();
        assert!(mask.insert(Flag::B));
        assert!(!mask.insert(Flag::B));
        assert!(mask.remove(Flag::B));
        assert!(!mask.remove(Flag::B));
        assert!(mask.is_empty());
    }

    #[test]
    fn iter_yields_values_in_declaration_order() {
        let mask = Bitmask::new(&[Flag::D, Flag::A, Flag::C, Flag::A]);
        let values: Vec<Flag> = mask.iter().collect();
        assert_eq!(values, vec![Flag::A, Flag::C, Flag::D]);
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn subset_and_superset() {
        let a = Bitmask::new(&[Flag::A]);
        let ab = Bitmask::new(&[Flag::A, Flag::B]);
        let c = Bitmask::new(&[Flag::C]);

        assert!(Bitmask::<Flag>::empty().is_subset(&a));
        assert!(a.is_subset(&ab));
        assert!(ab.is_superset(&a));
        assert!(!ab.is_subset(&a));
        assert!(!a.is_subset(&c));
    }

    #[test]
    fn union_and_intersection() {
        let ab = Bitmask::new(&[Flag::A, Flag::B]);
        let bc = Bitmask::new(&[Flag::B, Flag::C]);
        assert_eq!(ab.union(bc), Bitmask::new(&[Flag::A, Flag::B, Flag::C]));
        assert_eq!(ab.intersection(bc), Bitmask::new(&[Flag::B]));
        assert_eq!(Bitmask::<Flag>::all().count(), 4);
    }
}
