use crate::record::SalesWindow;

/// Estimate whole days until `on_hand` units run out at the recent sales rate.
///
/// Model: daily rate = `units_sold / window_days`; days = `ceil(on_hand / rate)`.
///
/// - No sales in the window: no estimate (`None`), the rate is unknown.
/// - Nothing on hand (zero or backordered): `Some(0)`.
pub fn days_until_stockout(on_hand: i64, units_sold: i64, window: SalesWindow) -> Option<u32> {
    if on_hand <= 0 {
        return Some(0);
    }
    if units_sold <= 0 {
        return None;
    }

    // on_hand / (units_sold / days) == on_hand * days / units_sold, kept in integers.
    let numerator = i128::from(on_hand) * i128::from(window.as_days());
    let denominator = i128::from(units_sold);
    let days = (numerator + denominator - 1) / denominator;

    Some(u32::try_from(days).unwrap_or(u32::MAX))
}
