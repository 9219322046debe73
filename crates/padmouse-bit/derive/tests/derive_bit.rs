use padmouse_bit_derive::Bit;
use padmouse_bit_mask::{Bitable, Bitmask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Bit)]
enum Pad {
    Up,
    Down,
    Left,
    Right,
}

#[test]
fn bits_follow_declaration_order() {
    assert_eq!(Pad::Up.bit(), 1);
    assert_eq!(Pad::Down.bit(), 2);
    assert_eq!(Pad::Right.index(), 3);
    assert_eq!(Pad::ALL, &[Pad::Up, Pad::Down, Pad::Left, Pad::Right]);
}

#[test]
fn derived_enum_works_with_bitmask() {
    let mut mask = Bitmask::new(&[Pad::Left]);
    mask.insert(Pad::Up);
    assert_eq!(mask.iter().collect::<Vec<_>>(), vec![Pad::Up, Pad::Left]);
}
