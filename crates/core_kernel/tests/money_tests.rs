//! Integration tests for money types

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal_macros::dec;

#[test]
fn test_minor_unit_boundary_conversion() {
    // Amounts headed for the gateway must be exact integer pesewas
    let m = Money::new(dec!(100.00), Currency::GHS);
    assert_eq!(m.to_minor_units().unwrap(), 10_000);

    let m = Money::new(dec!(0.01), Currency::GHS);
    assert_eq!(m.to_minor_units().unwrap(), 1);
}

#[test]
fn test_sub_minor_precision_uses_bankers_rounding() {
    // Third and fourth decimal places resolve half-to-even
    assert_eq!(
        Money::new(dec!(10.125), Currency::GHS).to_minor_units().unwrap(),
        1012
    );
    assert_eq!(
        Money::new(dec!(10.135), Currency::GHS).to_minor_units().unwrap(),
        1014
    );
}

#[test]
fn test_display_includes_symbol() {
    let m = Money::new(dec!(50.00), Currency::GHS);
    let rendered = m.to_string();
    assert!(rendered.contains("GH₵"));
    assert!(rendered.contains("50.00"));
}

#[test]
fn test_cross_currency_operations_rejected() {
    let ghs = Money::new(dec!(10), Currency::GHS);
    let usd = Money::new(dec!(10), Currency::USD);
    assert!(matches!(
        ghs.checked_sub(&usd),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}
