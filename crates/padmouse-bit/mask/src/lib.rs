mod atomic;
mod bitmask;

pub use atomic::AtomicBitmask;
pub use bitmask::{Bitmask, Iter};

/// A fieldless enum whose variants occupy distinct bits of a `u64`.
///
/// Usually implemented through `#[derive(Bit)]` from `padmouse-bit-derive`,
/// which assigns bits in declaration order.
pub trait Bitable: Copy + 'static {
    /// Every variant, in bit order.
    const ALL: &'static [Self];

    fn bit(&self) -> u64;
    fn index(&self) -> u32;
}
