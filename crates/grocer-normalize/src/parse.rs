//! Numeric and text parsing helpers shared by the pricing rules.
//!
//! Every helper is total: malformed input yields `None`, never an error, so
//! a bad field degrades the canonical record instead of failing the batch.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

/// A leading integer followed by the word "for", e.g. `"3 for"` or `"2 FOR"`.
static MULTI_BUY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d+)\s+for\b").expect("valid regex"));

/// Plain base-10 decimal text: digits with at most one point, optional sign.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)$").expect("valid regex"));

/// Bundle size read from multi-buy pre-price text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiBuy {
    /// The text is not a multi-buy phrase.
    NotMultiBuy,
    /// A multi-buy phrase with a usable count.
    Count(u32),
    /// A multi-buy phrase whose count is zero or does not fit in a `u32`.
    Unusable,
}

/// A positive monetary amount parsed from a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedPrice {
    /// Amount formatted for display, padded to at least two fractional
    /// digits and without a currency symbol, e.g. `"5.00"`.
    pub display: String,
    pub amount: f64,
}

/// Parses a price given as a JSON number or a string such as `"$3.99"`.
#[must_use]
pub fn parse_price(value: &Value) -> Option<ListedPrice> {
    match value {
        Value::Number(n) => parse_price_text(&n.to_string()),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Parses price text as a base-10 decimal after trimming and stripping a
/// leading `$`.
///
/// Exponent forms, digit separators, `inf`/`NaN`, and zero or negative
/// amounts are rejected.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<ListedPrice> {
    let cleaned = text.trim();
    let cleaned = cleaned.strip_prefix('$').unwrap_or(cleaned).trim();
    if !DECIMAL_RE.is_match(cleaned) {
        return None;
    }

    let mut decimal = Decimal::from_str(cleaned).ok()?;
    if decimal <= Decimal::ZERO {
        return None;
    }

    // Correctly rounded f64 of the canonical decimal text.
    let amount = decimal.to_string().parse::<f64>().ok()?;

    if decimal.scale() < 2 {
        decimal.rescale(2);
    }

    Some(ListedPrice {
        display: decimal.to_string(),
        amount,
    })
}

/// Parses a percentage in `(0, 100]` from a JSON number or numeric string.
/// A trailing `%` is accepted in the string form.
#[must_use]
pub fn parse_percent(value: &Value) -> Option<f64> {
    let percent = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .strip_suffix('%')
                .unwrap_or(trimmed)
                .trim()
                .parse::<f64>()
                .ok()?
        }
        _ => return None,
    };

    (percent.is_finite() && percent > 0.0 && percent <= 100.0).then_some(percent)
}

/// Parses a positive unit count from a JSON integer or integer string.
#[must_use]
pub fn parse_quantity(value: &Value) -> Option<u32> {
    let quantity = match value {
        Value::Number(n) => n.as_u64().and_then(|q| u32::try_from(q).ok())?,
        Value::String(s) => s.trim().parse::<u32>().ok()?,
        _ => return None,
    };

    (quantity >= 1).then_some(quantity)
}

/// Extracts the bundle size from multi-buy pre-price text such as `"3 for"`.
///
/// Only a leading integer followed by the word "for" counts; `"Buy 2"` or
/// `"for 3"` do not. Zero is rejected.
#[must_use]
pub fn parse_multi_buy_quantity(pre_text: &str) -> Option<u32> {
    match classify_multi_buy(pre_text) {
        MultiBuy::Count(quantity) => Some(quantity),
        MultiBuy::NotMultiBuy | MultiBuy::Unusable => None,
    }
}

/// Like [`parse_multi_buy_quantity`], but distinguishes text that is not a
/// multi-buy phrase from a multi-buy phrase whose count cannot be used.
#[must_use]
pub fn classify_multi_buy(pre_text: &str) -> MultiBuy {
    let Some(digits) = MULTI_BUY_RE.captures(pre_text).and_then(|c| c.get(1)) else {
        return MultiBuy::NotMultiBuy;
    };
    match digits.as_str().parse::<u32>() {
        Ok(quantity) if quantity >= 1 => MultiBuy::Count(quantity),
        _ => MultiBuy::Unusable,
    }
}

/// Formats a percentage for display, dropping a redundant `.0`.
#[must_use]
pub fn format_percent(percent: f64) -> String {
    // f64's Display already prints 50.0 as "50" and 12.5 as "12.5".
    percent.to_string()
}

/// Returns `true` when text mentions a membership or loyalty card.
#[must_use]
pub fn mentions_loyalty(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("member") || lower.contains("card")
}
