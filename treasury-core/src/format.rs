//! ADA amount and percentage formatting for display.

/// Placeholder shown when a figure is unavailable.
pub const PLACEHOLDER: &str = "—";

/// Currency suffix.
pub const ADA_SYMBOL: &str = "₳";

/// Headline formatting used for stat cards.
///
/// Billions and millions get two decimals, tens of thousands one decimal,
/// anything smaller is rounded and grouped: `1.23B ₳`, `45.2K ₳`, `999 ₳`.
pub fn format_ada(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    if value >= 1_000_000_000.0 {
        return format!("{:.2}B {}", value / 1_000_000_000.0, ADA_SYMBOL);
    }
    if value >= 1_000_000.0 {
        return format!("{:.2}M {}", value / 1_000_000.0, ADA_SYMBOL);
    }
    if value >= 10_000.0 {
        return format!("{:.1}K {}", value / 1_000.0, ADA_SYMBOL);
    }
    format!("{} {}", group_thousands(value.round() as i64), ADA_SYMBOL)
}

/// Compact formatting used in the contract explorer.
///
/// Missing, zero and non-finite amounts render as the placeholder; every tier uses a
/// single decimal.
pub fn format_currency(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => return PLACEHOLDER.to_string(),
    };
    if value >= 1_000_000_000.0 {
        return format!("{:.1}B {}", value / 1_000_000_000.0, ADA_SYMBOL);
    }
    if value >= 1_000_000.0 {
        return format!("{:.1}M {}", value / 1_000_000.0, ADA_SYMBOL);
    }
    if value >= 10_000.0 {
        return format!("{:.1}K {}", value / 1_000.0, ADA_SYMBOL);
    }
    format!("{} {}", group_thousands(value.round() as i64), ADA_SYMBOL)
}

/// Hero formatting: like [`format_ada`] but with a thousands tier from 1K and
/// up to three decimals below it. Missing values render as the placeholder.
pub fn format_ada_brief(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return PLACEHOLDER.to_string(),
    };
    if value >= 1_000_000_000.0 {
        return format!("{:.2}B {}", value / 1_000_000_000.0, ADA_SYMBOL);
    }
    if value >= 1_000_000.0 {
        return format!("{:.2}M {}", value / 1_000_000.0, ADA_SYMBOL);
    }
    if value >= 1_000.0 {
        return format!("{:.1}K {}", value / 1_000.0, ADA_SYMBOL);
    }
    format!("{} {}", format_amount(value), ADA_SYMBOL)
}

/// Grouped digits with at most three decimals, trailing zeros dropped:
/// `1,234.5`, `42`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let fixed = format!("{:.3}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let negative = value < 0.0 && (whole != "0" || !fraction.is_empty());

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole.parse().unwrap_or_default()));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// `12.5%` style percentage with a fixed number of decimals.
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{:.*}%", decimals, value)
}

/// Insert `,` between groups of three digits.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
