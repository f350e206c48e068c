//! Display helpers shared by every page.
//!
//! These are pure functions: the caller supplies "now" for anything
//! time-relative so output is deterministic.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol prefixed to every rendered price.
pub const CURRENCY_SYMBOL: &str = "¥";

const TEN_THOUSAND: u64 = 10_000;
const THOUSAND: u64 = 1_000;

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as `¥12.50`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{:.2}", round_cents(amount))
}

/// Split an amount into integer and fractional parts (`"12"`, `"50"`), for
/// layouts that render the cents smaller.
#[must_use]
pub fn format_price_parts(amount: Decimal) -> (String, String) {
    let rendered = format!("{:.2}", round_cents(amount));
    match rendered.split_once('.') {
        Some((int, frac)) => (int.to_string(), frac.to_string()),
        None => (rendered, "00".to_string()),
    }
}

/// Compact count for sales and review badges: `999`, `1.2k`, `3.5w`.
#[must_use]
pub fn format_count(n: u64) -> String {
    if n >= TEN_THOUSAND {
        compact(n, TEN_THOUSAND, "w")
    } else if n >= THOUSAND {
        compact(n, THOUSAND, "k")
    } else {
        n.to_string()
    }
}

fn compact(n: u64, unit: u64, suffix: &str) -> String {
    // One decimal, truncated, so 1999 renders as 1.9k rather than 2.0k.
    let tenths = n / (unit / 10);
    let (whole, frac) = (tenths / 10, tenths % 10);
    if frac == 0 {
        format!("{whole}{suffix}")
    } else {
        format!("{whole}.{frac}{suffix}")
    }
}

/// Discount label such as `8.5折` when `price` is strictly below `original`.
#[must_use]
pub fn format_discount(price: Decimal, original: Decimal) -> Option<String> {
    if original <= Decimal::ZERO || price >= original {
        return None;
    }
    let ratio = (price / original * Decimal::TEN)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    Some(format!("{ratio}折"))
}

/// Format a timestamp with a chrono pattern, e.g. `"%Y-%m-%d %H:%M"`.
#[must_use]
pub fn format_date<Tz: TimeZone>(ts: &DateTime<Tz>, pattern: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format(pattern).to_string()
}

/// Human readable age of `ts` relative to `now`.
///
/// Falls back to the calendar date for anything a week or older, or in the
/// future.
#[must_use]
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);
    if elapsed.num_seconds() < 0 {
        return format_date(&ts, "%Y-%m-%d");
    }

    match elapsed.num_minutes() {
        0 => "just now".to_string(),
        1 => "1 minute ago".to_string(),
        m @ 2..=59 => format!("{m} minutes ago"),
        _ => match elapsed.num_hours() {
            1 => "1 hour ago".to_string(),
            h @ 2..=23 => format!("{h} hours ago"),
            _ => match elapsed.num_days() {
                1 => "1 day ago".to_string(),
                d @ 2..=6 => format!("{d} days ago"),
                _ => format_date(&ts, "%Y-%m-%d"),
            },
        },
    }
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Mask the middle four digits of an 11-digit mobile number.
#[must_use]
pub fn mask_phone(phone: &str) -> String {
    if phone.len() != 11 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return phone.to_string();
    }
    match (phone.get(..3), phone.get(7..)) {
        (Some(head), Some(tail)) => format!("{head}****{tail}"),
        _ => phone.to_string(),
    }
}
