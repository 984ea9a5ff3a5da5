//! USD display formatting shared by quote payloads and alert messages.

/// Formats a USD amount with thousands separators. Prices below one dollar keep up
/// to six decimals (never fewer than two); everything else gets two.
pub fn format_price(price: f64) -> String {
    let abs = price.abs();
    let mut digits = if abs < 1.0 {
        format!("{:.6}", abs)
    } else {
        format!("{:.2}", abs)
    };

    if abs < 1.0 {
        // keep at least "0.00"
        while digits.ends_with('0') && digits.len() > digits.find('.').unwrap_or(0) + 3 {
            digits.pop();
        }
    }

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

/// Formats a market capitalisation with a T/B/M suffix.
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${:.0}", value)
    }
}

/// Signed percentage with two decimals, e.g. `+3.57%`.
pub fn format_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

fn group_thousands(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_large_values() {
        assert_eq!(format_price(45_000.0), "$45,000.00");
        assert_eq!(format_price(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_price(999.5), "$999.50");
    }

    #[test]
    fn test_format_price_sub_dollar_keeps_precision() {
        assert_eq!(format_price(0.123456), "$0.123456");
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(0.0712), "$0.0712");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(-1500.0), "-$1,500.00");
    }

    #[test]
    fn test_format_market_cap_suffixes() {
        assert_eq!(format_market_cap(1.5e12), "$1.50T");
        assert_eq!(format_market_cap(2.25e9), "$2.25B");
        assert_eq!(format_market_cap(7.0e6), "$7.00M");
        assert_eq!(format_market_cap(5_000.0), "$5000");
    }

    #[test]
    fn test_format_percent_sign() {
        assert_eq!(format_percent(3.5714), "+3.57%");
        assert_eq!(format_percent(0.0), "+0.00%");
        assert_eq!(format_percent(-1.2), "-1.20%");
    }
}
