//! Booking price calculation
//!
//! Hours and money are both rounded half-up to two decimal places. The price
//! is computed from the already-rounded hours so that
//! `total_price == round(total_hours * rate, 2)` holds for the stored values.

use rust_decimal::{Decimal, RoundingStrategy};

use super::window::TimeWindow;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Result of pricing a window at a given hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub total_hours: Decimal,
    pub total_price: Decimal,
}

/// Compute `(total_hours, total_price)` for a window.
pub fn compute(window: &TimeWindow, hourly_rate: Decimal) -> PriceQuote {
    let millis = Decimal::from(window.duration().num_milliseconds());
    let total_hours = round_half_up(millis / Decimal::from(MILLIS_PER_HOUR));
    let total_price = round_half_up(total_hours * hourly_rate);

    PriceQuote {
        total_hours,
        total_price,
    }
}

/// Round half-up (away from zero) to two decimal places, always keeping
/// a scale of two so `10` renders as `10.00`.
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Convert a two-decimal amount into integer hundredths (cents for money).
pub fn to_hundredths(value: Decimal) -> Option<i64> {
    let rounded = round_half_up(value);
    i64::try_from(rounded.mantissa()).ok()
}

/// Inverse of [`to_hundredths`].
pub fn from_hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn window(minutes: i64) -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        TimeWindow::new(start, start + Duration::minutes(minutes))
    }

    #[test]
    fn two_hours_at_five_per_hour() {
        let quote = compute(&window(120), dec("5"));
        assert_eq!(quote.total_hours, dec("2.00"));
        assert_eq!(quote.total_price, dec("10.00"));
        assert_eq!(quote.total_price.to_string(), "10.00");
    }

    #[test]
    fn price_uses_rounded_hours() {
        // 80 minutes = 1.333.. hours -> 1.33
        let quote = compute(&window(80), dec("3"));
        assert_eq!(quote.total_hours, dec("1.33"));
        assert_eq!(quote.total_price, dec("3.99"));
    }

    #[test]
    fn price_rounds_half_up() {
        // 0.75 h * 2.50 = 1.875 -> 1.88
        let quote = compute(&window(45), dec("2.50"));
        assert_eq!(quote.total_hours, dec("0.75"));
        assert_eq!(quote.total_price, dec("1.88"));
    }

    #[test]
    fn hours_round_half_up() {
        // 1818 s = 0.505 h -> 0.51
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        let w = TimeWindow::new(start, start + Duration::seconds(1818));
        assert_eq!(compute(&w, dec("1")).total_hours, dec("0.51"));
    }

    #[test]
    fn compute_is_deterministic() {
        let w = window(97);
        let rate = dec("3.35");
        assert_eq!(compute(&w, rate), compute(&w, rate));
    }

    #[test]
    fn hundredths_conversion() {
        assert_eq!(to_hundredths(dec("10")), Some(1000));
        assert_eq!(to_hundredths(dec("3.999")), Some(400));
        assert_eq!(from_hundredths(1234), dec("12.34"));
        assert_eq!(from_hundredths(1234).to_string(), "12.34");
    }
}
