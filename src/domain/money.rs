use rust_decimal::{Decimal, RoundingStrategy};

/// Currency every menu price and order total is denominated in.
pub const STORE_CURRENCY: &str = "CVE";

/// Currency the payment provider charges in. The provider does not support
/// the store currency, so amounts are converted at a configured rate.
pub const PAYMENT_CURRENCY: &str = "usd";

/// Renders an amount as `"<amount fixed to 2 decimals> <currency code>"`,
/// e.g. `"1500.00 CVE"`.
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2} {}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        STORE_CURRENCY
    )
}

/// Converts a store-currency amount into minor units of the payment
/// currency (cents) at the given exchange rate.
///
/// Each line converts and rounds independently; no rounding error is
/// carried across lines. Rounding is standard half-away-from-zero.
pub fn to_minor_units(amount: Decimal, store_per_payment_rate: Decimal) -> i64 {
    let cents = amount / store_per_payment_rate * Decimal::ONE_HUNDRED;
    cents
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .try_into()
        .unwrap_or(i64::MAX)
}
