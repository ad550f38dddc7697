// Field codec
//
// The switch's CGI endpoints speak a home-grown framing: field names or
// `name=value` pairs terminated by `$;`. Reads send `R=<names>` and get
// values back positionally; writes send `W=<pairs>`. Some endpoints pack
// query-string style `key=value&key=value` lines inside a positional slot.
// There is no escaping, so values are scrubbed of the delimiter on write.

use std::collections::HashMap;

use indexmap::IndexMap;

/// Terminates every field in both directions.
pub const FIELD_DELIMITER: &str = "$;";

/// Prefix of a read selector.
const READ_PREFIX: &str = "R=";

/// Prefix of a write frame.
const WRITE_PREFIX: &str = "W=";

/// Encode a read selector: `R=name1$;name2$;`.
///
/// Response values come back in the same order, so the slice passed here
/// must be the one later handed to [`decode_positional`].
pub fn encode_read_selector<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = String::from(READ_PREFIX);
    for field in fields {
        out.push_str(field.as_ref().trim());
        out.push_str(FIELD_DELIMITER);
    }
    out
}

/// Encode a write frame: `W=name1=value1$;name2=value2$;`.
///
/// Values are passed through [`sanitize_value`]; insertion order is kept.
pub fn encode_write_frame(pairs: &IndexMap<String, String>) -> String {
    let mut out = String::from(WRITE_PREFIX);
    for (field, value) in pairs {
        out.push_str(field);
        out.push('=');
        out.push_str(&sanitize_value(value));
        out.push_str(FIELD_DELIMITER);
    }
    out
}

/// Strip surrounding whitespace and every occurrence of the delimiter.
///
/// Removal repeats until stable: dropping one `$;` out of `$$;;` would
/// otherwise leave a fresh delimiter behind.
pub fn sanitize_value(value: &str) -> String {
    let mut out = value.trim().to_owned();
    while out.contains(FIELD_DELIMITER) {
        out = out.replace(FIELD_DELIMITER, "");
    }
    out
}

/// Zip a positional response body with the field names that were requested.
///
/// Missing trailing values map to `None`. An empty body yields all `None`.
/// A trailing delimiter produces an empty final segment, which simply has
/// no field to land on.
pub fn decode_positional<S: AsRef<str>>(
    body: &str,
    fields: &[S],
) -> IndexMap<String, Option<String>> {
    let body = body.trim();
    let parts: Vec<&str> = if body.is_empty() {
        Vec::new()
    } else {
        body.split(FIELD_DELIMITER).map(str::trim).collect()
    };

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let value = parts.get(index).map(|part| (*part).to_owned());
            (field.as_ref().to_owned(), value)
        })
        .collect()
}

/// Non-empty delimited entries, each with its original zero-based position.
///
/// Multi-entry endpoints (bandwidth, port status, VLANs) number their rows
/// by position, so gaps left by empty slots must not shift later entries.
pub fn split_entries(body: &str) -> Vec<(usize, &str)> {
    body.trim()
        .split(FIELD_DELIMITER)
        .map(str::trim)
        .enumerate()
        .filter(|(_, entry)| !entry.is_empty())
        .collect()
}

/// Decode an `&`-joined `key=value` line with form-urlencoded rules.
///
/// Duplicate keys: the last value wins.
pub fn decode_key_value_line(line: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(line.trim().as_bytes())
        .into_owned()
        .collect()
}

/// Whether a write/save response acknowledges success.
///
/// The firmware answers with a body containing `OK` in some casing;
/// anything else is a rejection.
pub fn is_acknowledged(body: &str) -> bool {
    body.to_ascii_lowercase().contains("ok")
}
