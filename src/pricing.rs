//! Pricing
//!
//! Delivery fee policy and order totals. Everything here is a pure function of
//! the subtotal and the chosen delivery option.

use rusty_money::{
    Money,
    iso::{Currency, GBP},
};

use crate::delivery::DeliveryOption;

/// Delivery is free at or above this subtotal, in pence.
pub const FREE_DELIVERY_THRESHOLD_MINOR: i64 = 4500;

/// Fee charged for delivery below the threshold, in pence.
pub const FLAT_DELIVERY_FEE_MINOR: i64 = 500;

/// Delivery fee for a subtotal and delivery option.
pub fn delivery_fee(
    subtotal: &Money<'static, Currency>,
    option: DeliveryOption,
) -> Money<'static, Currency> {
    let currency = subtotal.currency();

    match option {
        DeliveryOption::Pickup => Money::from_minor(0, currency),
        DeliveryOption::Delivery if subtotal.to_minor_units() >= FREE_DELIVERY_THRESHOLD_MINOR => {
            Money::from_minor(0, currency)
        }
        DeliveryOption::Delivery => Money::from_minor(FLAT_DELIVERY_FEE_MINOR, currency),
    }
}

/// Subtotal, delivery fee and grand total for an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: Money<'static, Currency>,

    /// Fee for the chosen delivery option
    pub delivery_fee: Money<'static, Currency>,

    /// `subtotal + delivery_fee`
    pub total: Money<'static, Currency>,
}

impl OrderTotals {
    /// Compute totals for `subtotal` under `option`.
    pub fn compute(subtotal: Money<'static, Currency>, option: DeliveryOption) -> Self {
        let delivery_fee = delivery_fee(&subtotal, option);
        let total = Money::from_minor(
            subtotal
                .to_minor_units()
                .saturating_add(delivery_fee.to_minor_units()),
            subtotal.currency(),
        );

        Self {
            subtotal,
            delivery_fee,
            total,
        }
    }
}

/// Amount still needed for free delivery, or `None` once it is reached.
pub fn remaining_for_free_delivery(
    subtotal: &Money<'static, Currency>,
) -> Option<Money<'static, Currency>> {
    let remaining = FREE_DELIVERY_THRESHOLD_MINOR - subtotal.to_minor_units();

    (remaining > 0).then(|| Money::from_minor(remaining, subtotal.currency()))
}

/// Format money as a display price, e.g. `£4.50`.
///
/// Amounts are exact: the number of decimal places follows the currency's
/// exponent. Currencies other than GBP are suffixed with their ISO code.
pub fn format_price(money: &Money<'_, Currency>) -> String {
    let currency = money.currency();
    let minor_units = money.to_minor_units();
    let scale = 10_u64.checked_pow(currency.exponent).unwrap_or(1);
    let abs_minor = minor_units.unsigned_abs();
    let sign = if minor_units < 0 { "-" } else { "" };

    let amount = match usize::try_from(currency.exponent) {
        Ok(0) | Err(_) => abs_minor.to_string(),
        Ok(places) => format!("{}.{:0places$}", abs_minor / scale, abs_minor % scale),
    };

    if currency.iso_alpha_code == GBP.iso_alpha_code {
        format!("{sign}£{amount}")
    } else {
        format!("{sign}{amount} {}", currency.iso_alpha_code)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::JPY;

    use super::*;

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, GBP)
    }

    #[test]
    fn delivery_just_below_threshold_pays_flat_fee() {
        let totals = OrderTotals::compute(gbp(4499), DeliveryOption::Delivery);

        assert_eq!(totals.delivery_fee, gbp(500));
        assert_eq!(totals.total, gbp(4999));
    }

    #[test]
    fn delivery_at_threshold_is_free() {
        let totals = OrderTotals::compute(gbp(4500), DeliveryOption::Delivery);

        assert_eq!(totals.delivery_fee, gbp(0));
        assert_eq!(totals.total, gbp(4500));
    }

    #[test]
    fn pickup_is_always_free() {
        for subtotal in [0, 1000, 4499, 10_000] {
            let totals = OrderTotals::compute(gbp(subtotal), DeliveryOption::Pickup);

            assert_eq!(totals.delivery_fee, gbp(0));
            assert_eq!(totals.total, gbp(subtotal));
        }
    }

    #[test]
    fn empty_cart_delivery_still_charges_fee() {
        let totals = OrderTotals::compute(gbp(0), DeliveryOption::Delivery);

        assert_eq!(totals.total, gbp(500));
    }

    #[test]
    fn remaining_for_free_delivery_counts_down() {
        assert_eq!(remaining_for_free_delivery(&gbp(4000)), Some(gbp(500)));
        assert_eq!(remaining_for_free_delivery(&gbp(4500)), None);
    }

    #[test]
    fn format_price_pads_pence() {
        assert_eq!(format_price(&gbp(450)), "£4.50");
        assert_eq!(format_price(&gbp(5)), "£0.05");
        assert_eq!(format_price(&gbp(-250)), "-£2.50");
    }

    #[test]
    fn format_price_follows_currency_exponent() {
        assert_eq!(format_price(&Money::from_minor(1234, JPY)), "1234 JPY");
        assert_eq!(format_price(&Money::from_minor(-5, JPY)), "-5 JPY");
    }
}
