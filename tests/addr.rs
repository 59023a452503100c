use pretty_assertions::assert_eq;

use charybdis::BankAddr;

// A switched bank ends at $7FFF; stepping past it is `None`, never `1:8000`.
#[test]
fn next_stops_at_window_end() {
    assert_eq!(BankAddr::new(0, 0x3FFF).next(), None);
    assert_eq!(BankAddr::new(3, 0x7FFF).next(), None);
    assert_eq!(BankAddr::new(0, 0x3FFE).next(), Some(BankAddr::new(0, 0x3FFF)));
    assert_eq!(BankAddr::new(1, 0x4000).next(), Some(BankAddr::new(1, 0x4001)));
}

#[test]
fn rom_index_is_linear() {
    assert_eq!(BankAddr::new(0, 0x0150).rom_index(), 0x0150);
    assert_eq!(BankAddr::new(1, 0x4000).rom_index(), 0x4000);
    assert_eq!(BankAddr::new(2, 0x4000).rom_index(), 0x8000);
    assert_eq!(BankAddr::new(2, 0x7FFF).rom_index(), 0xBFFF);
    assert_eq!(BankAddr::from_rom_index(0x8001), BankAddr::new(2, 0x4001));
}

#[test]
fn windows() {
    let home = BankAddr::start(0);
    assert_eq!((home.window_start(), home.window_end()), (0x0000, 0x3FFF));
    let switched = BankAddr::start(5);
    assert_eq!(switched, BankAddr::new(5, 0x4000));
    assert_eq!(switched.window_end(), 0x7FFF);
    assert!(switched.is_rom());
    assert!(!BankAddr::new(5, 0x0100).is_rom());
    assert!(!BankAddr::new(0, 0x4000).is_rom());
}

#[test]
fn checked_add_stays_in_the_window() {
    let at = BankAddr::new(1, 0x7FFD);
    assert_eq!(at.checked_add(2), Some(BankAddr::new(1, 0x7FFF)));
    assert_eq!(at.checked_add(3), None);
    assert_eq!(BankAddr::start(0).checked_add(0x4000), None);
}

#[test]
fn display_and_order() {
    assert_eq!(BankAddr::new(0x1F, 0x4A0C).to_string(), "1F:4A0C");
    assert!(BankAddr::new(0, 0x3FFF) < BankAddr::new(1, 0x4000));
    assert!(BankAddr::new(1, 0x7FFF) < BankAddr::new(2, 0x4000));
}

#[test]
#[should_panic(expected = "not a ROM address")]
fn rom_index_of_a_ram_address_panics() {
    let _ = BankAddr::new(1, 0x1234).rom_index();
}

#[test]
#[should_panic(expected = "not a ROM address")]
fn offset_outside_the_window_panics() {
    let _ = BankAddr::new(0, 0xC000).offset();
}
