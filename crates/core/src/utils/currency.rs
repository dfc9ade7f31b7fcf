use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CURRENCY_SYMBOL, DISPLAY_DECIMAL_PRECISION};

/// Thousands separator (narrow no-break space).
const GROUP_SEPARATOR: char = '\u{202F}';
/// Between the amount and the symbol (no-break space).
const SYMBOL_SEPARATOR: char = '\u{00A0}';

/// Formats an amount in euros the French way: `1 234,50 €`.
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(DISPLAY_DECIMAL_PRECISION);

    let text = rounded.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if !fraction.is_empty() {
        out.push(',');
        out.push_str(fraction);
    }
    out.push(SYMBOL_SEPARATOR);
    out.push_str(CURRENCY_SYMBOL);
    out
}

/// Formats a whole percentage: `15 %`.
pub fn format_percent(percent: u8) -> String {
    format!("{}{}%", percent, SYMBOL_SEPARATOR)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * GROUP_SEPARATOR.len_utf8());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}
