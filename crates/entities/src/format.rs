use alloy_primitives::utils::format_units;
use alloy_primitives::U256;

/// Render a raw integer amount as a human string with tiered precision.
///
/// Tiers: exact zero is "0", below 0.0001 is "<0.0001", below 1 keeps six
/// decimal places, below 1000 keeps four, everything else is grouped with at
/// most two decimal places. Callers rely on this exact contract.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let formatted = format_units(amount, decimals).unwrap_or_default();
    let value: f64 = formatted.parse().unwrap_or_default();

    if value == 0.0 {
        return "0".to_string();
    }
    if value < 0.0001 {
        return "<0.0001".to_string();
    }
    if value < 1.0 {
        return format!("{value:.6}");
    }
    if value < 1000.0 {
        return format!("{value:.4}");
    }
    format_grouped(value)
}

// en-US thousand grouping, trailing fractional zeros trimmed
fn format_grouped(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}
