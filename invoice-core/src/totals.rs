use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};
use crate::model::LineItem;

/// Flat tax applied to every invoice subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Digits kept after the decimal point for currency amounts.
const CURRENCY_DP: u32 = 2;

/// Derived money fields of an invoice. Always produced together by
/// [`recompute`]; never edited field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Sum the item amounts and apply [`TAX_RATE`].
///
/// Item amounts are taken as given; keeping `amount = quantity * rate`
/// is the job of the item setters. Fails with `AmountOverflow` when a
/// sum leaves the range of `Decimal`.
pub fn recompute(items: &[LineItem]) -> Result<Totals> {
    let subtotal = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount()))
        .ok_or(Error::AmountOverflow)?;
    let tax = subtotal
        .checked_mul(TAX_RATE)
        .map(round_currency)
        .ok_or(Error::AmountOverflow)?;
    let total = subtotal.checked_add(tax).ok_or(Error::AmountOverflow)?;
    Ok(Totals {
        subtotal,
        tax,
        total,
    })
}

/// `quantity * rate`, exact.
pub fn line_amount(quantity: u32, rate: Decimal) -> Result<Decimal> {
    Decimal::from(quantity)
        .checked_mul(rate)
        .ok_or(Error::AmountOverflow)
}

/// Round to cents, halves away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tax_rate_is_ten_percent() {
        assert_eq!(TAX_RATE, dec!(0.10));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(0.124)), dec!(0.12));
        assert_eq!(round_currency(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn empty_items_give_zero_totals() {
        assert_eq!(recompute(&[]).unwrap(), Totals::default());
    }

    #[test]
    fn line_amount_is_exact() {
        assert_eq!(line_amount(3, dec!(0.1)).unwrap(), dec!(0.3));
        assert_eq!(line_amount(0, dec!(99.99)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn line_amount_past_decimal_range_is_an_error() {
        assert!(matches!(line_amount(2, Decimal::MAX), Err(Error::AmountOverflow)));
        assert_eq!(line_amount(1, Decimal::MAX).unwrap(), Decimal::MAX);
    }
}
