//! Utility functions and helpers

use serde_json::Value;

/// Join key for every cross-source lookup: trimmed, lowercased.
pub fn canonical_address(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Display fallback when upstream has no name: `0xabcd…6789`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Deterministic pool page link
pub fn pool_link(chain: &str, address: &str) -> String {
    format!("https://curve.fi/#/{}/pools/{}", chain, address)
}

/// Best-effort numeric coercion. Numbers and numeric strings pass,
/// everything else (including NaN/inf) is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// "null", empty strings and JSON null count as absent
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("null")
        }
        _ => false,
    }
}

/// Format USD amount: $1.23B / $4.56M / $7.89k / $12
pub fn format_money(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "—".to_string();
    };
    if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("${:.2}k", v / 1e3)
    } else {
        format!("${:.0}", v)
    }
}

/// Format fractional rate as percent
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "—".to_string(),
    }
}
