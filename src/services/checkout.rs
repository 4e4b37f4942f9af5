use crate::database::models::PricedLine;

/// Sum of quantity x unit price over the cart; an empty cart totals 0.
/// `None` when the total does not fit in an i64.
pub fn checkout_total(lines: &[PricedLine]) -> Option<i64> {
    lines.iter().try_fold(0i64, |total, line| {
        i64::from(line.quantity)
            .checked_mul(line.unit_price)
            .and_then(|amount| total.checked_add(amount))
    })
}
