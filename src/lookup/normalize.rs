use serde_json::Value;

pub const NO_BIO: &str = "No bio.";
pub const NOT_AVAILABLE: &str = "N/A";

/// Drop blank strings so they fall through to the caller's default.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Format an integer with `,` thousands separators (`1234567` -> `1,234,567`).
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse the leading run of digits of a raw markup fragment, the way scraped
/// counters like `123` or ` 123}` appear inside inline scripts.
///
/// Returns None when the fragment does not start with a number.
pub fn parse_leading_int(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Render a counter found in a JSON blob: numbers get thousands separators,
/// strings are taken as-is.
pub fn json_count_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(group_thousands).or_else(|| Some(n.to_string())),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Count rendered as text, or `"N/A"`.
pub fn count_or_na(count: Option<u64>) -> String {
    count
        .map(group_thousands)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
