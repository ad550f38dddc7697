// ── Wire-to-domain conversions ──
//
// The switch reports everything as strings. These helpers turn them into
// numbers and flags, leniently, and scrub user text before it is written
// back to system-info fields.

use std::collections::HashMap;

use planet_api::codec::FIELD_DELIMITER;

/// First signed integer found in `raw`, e.g. `"1000Mbps"` -> `1000`.
pub fn numeric(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse() {
        return Some(n);
    }

    let bytes = raw.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let negative = start > 0 && bytes.get(start - 1) == Some(&b'-');
    let digits: String = raw[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Loose boolean: `1/true/yes/on/up/present` and their opposites.
pub fn flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "up" | "present" => Some(true),
        "0" | "false" | "no" | "off" | "down" | "absent" => Some(false),
        _ => None,
    }
}

/// `params[key] == "1"`, or `None` if the key is missing.
pub(crate) fn is_one(params: &HashMap<String, String>, key: &str) -> Option<bool> {
    params.get(key).map(|v| v == "1")
}

/// Integer value of `params[key]`, if present and numeric.
pub(crate) fn int_param(params: &HashMap<String, String>, key: &str) -> Option<i64> {
    params.get(key).and_then(|v| numeric(v))
}

/// Make `value` safe for a system-info text field and cut it to `limit`
/// characters.
///
/// Control whitespace becomes a space, runs of whitespace collapse to a
/// single `.`, the field delimiter is removed, and anything outside
/// `[A-Za-z0-9_.-]` becomes `_`.
pub fn normalize_system_value(value: &str, limit: usize) -> String {
    let spaced: String = value
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect();

    let mut dotted = String::with_capacity(spaced.len());
    let mut in_space = false;
    for c in spaced.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                dotted.push('.');
            }
            in_space = true;
        } else {
            dotted.push(c);
            in_space = false;
        }
    }

    dotted
        .replace(FIELD_DELIMITER, "")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numeric_extracts_first_integer() {
        assert_eq!(numeric("1000"), Some(1000));
        assert_eq!(numeric(" 42 "), Some(42));
        assert_eq!(numeric("1000Mbps"), Some(1000));
        assert_eq!(numeric("port -3"), Some(-3));
        assert_eq!(numeric("v1.2"), Some(1));
        assert_eq!(numeric("n/a"), None);
        assert_eq!(numeric(""), None);
    }

    #[test]
    fn flag_accepts_common_spellings() {
        assert_eq!(flag("1"), Some(true));
        assert_eq!(flag("Present"), Some(true));
        assert_eq!(flag("DOWN"), Some(false));
        assert_eq!(flag("absent"), Some(false));
        assert_eq!(flag("2"), None);
        assert_eq!(flag(""), None);
    }

    #[test]
    fn device_name_is_scrubbed_and_truncated() {
        assert_eq!(
            normalize_system_value("Lab Switch #1!!", 15),
            "Lab.Switch._1__"
        );
    }

    #[test]
    fn control_whitespace_collapses() {
        assert_eq!(
            normalize_system_value("  rack 4\r\n\trow  B ", 25),
            "rack.4.row.B"
        );
    }

    #[test]
    fn delimiter_never_survives() {
        assert_eq!(normalize_system_value("a$;b", 25), "ab");
        assert_eq!(normalize_system_value("über", 25), "_ber");
    }
}
