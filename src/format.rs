use rust_decimal::{Decimal, RoundingStrategy};

/// Compact rupee amount for summaries: `LKR 1.2 M`, `LKR 75 k`, `LKR 950`.
///
/// Negative values keep their sign in front of the number.
pub fn fmt_lkr(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let magnitude = amount.abs();
    let million = Decimal::new(1_000_000, 0);
    let thousand = Decimal::new(1_000, 0);

    if magnitude >= million {
        format!("LKR {}{:.1} M", sign, (magnitude / million).round_dp(1))
    } else if magnitude >= thousand {
        format!("LKR {}{:.0} k", sign, (magnitude / thousand).round_dp(0))
    } else {
        format!("LKR {}{}", sign, magnitude.round_dp(0))
    }
}

/// Full rupee amount with thousands separators and two decimals, for record
/// listings.
pub fn fmt_lkr_exact(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("LKR {}{}.{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
