use super::*;

type Strategy = fn(&str) -> Option<Vec<Value>>;

/// Tried in order; the first strategy that yields an array wins.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("whole_response", parse_whole_response),
    ("bracketed_array", parse_bracketed_array),
    ("trailing_comma_repair", parse_repaired_array),
];

/// Recovers the record list from a raw model response: strict JSON, then the
/// first balanced `[...]` in the text, then that slice with trailing commas
/// removed.
pub fn decode_records(raw: &str) -> Result<Vec<Record>, DecodeError> {
    let (strategy, values) = STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(raw).map(|values| (*name, values)))
        .ok_or_else(|| DecodeError::from_response(raw))?;

    debug!(strategy, values = values.len(), "decoded model response");
    Ok(into_records(values))
}

/// A wrapping object yields its `items` array, otherwise the first field (in
/// response order) holding a non-empty list of objects.
fn parse_whole_response(raw: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Array(values) => Some(values),
        Value::Object(object) => {
            let (items, others): (Vec<_>, Vec<_>) =
                object.into_iter().partition(|(key, _)| key == "items");
            items
                .into_iter()
                .chain(others)
                .find_map(|(key, value)| match value {
                    Value::Array(values) if key == "items" || is_record_list(&values) => Some(values),
                    _ => None,
                })
        }
        _ => None,
    }
}

fn is_record_list(values: &[Value]) -> bool {
    !values.is_empty() && values.iter().all(Value::is_object)
}

fn parse_bracketed_array(raw: &str) -> Option<Vec<Value>> {
    serde_json::from_str(first_json_array(raw)?).ok()
}

fn parse_repaired_array(raw: &str) -> Option<Vec<Value>> {
    let trailing_comma = Regex::new(r",\s*([}\]])").ok()?;
    let repaired = trailing_comma.replace_all(first_json_array(raw)?, "$1");
    serde_json::from_str(&repaired).ok()
}

/// Slice from the first `[` to its matching `]`, ignoring brackets inside
/// string literals.
pub(super) fn first_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in raw.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn into_records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(record) => Some(record),
            other => {
                warn!(value = %other, "ignoring non-object entry in model response");
                None
            }
        })
        .collect()
}
