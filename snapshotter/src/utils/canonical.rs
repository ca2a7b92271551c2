//! Canonical JSON encoding of snapshot payloads.
//!
//! Two structurally equal payloads always produce the same bytes, and therefore the same
//! content identifier: object keys are sorted, separators carry no whitespace, and every
//! non-ASCII character is escaped as `\uXXXX` (UTF-16 code units).

use serde::Serialize;
use serde_json::Value;

/// Serializes `value` to its canonical byte form
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value);
    Ok(out.into_bytes())
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_string(out, text),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Byte order of UTF-8 keys equals code point order
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (idx, (key, item)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Serialize)]
    struct PairReserves {
        token1: u64,
        token0: u64,
        contract: &'static str,
    }

    #[derive(Serialize)]
    struct PairReservesReordered {
        contract: &'static str,
        token0: u64,
        token1: u64,
    }

    #[test]
    fn test_field_order_does_not_change_bytes() {
        let a = to_canonical_bytes(&PairReserves { token1: 2, token0: 1, contract: "0xabc" }).unwrap();
        let b = to_canonical_bytes(&PairReservesReordered { contract: "0xabc", token0: 1, token1: 2 }).unwrap();
        assert_eq!(a, b);
        assert_eq!(String::from_utf8(a).unwrap(), r#"{"contract":"0xabc","token0":1,"token1":2}"#);
    }

    #[test]
    fn test_nested_values_are_compact() {
        let payload = json!({"z": [1, {"b": null, "a": true}], "a": {"y": 1.5, "x": "v"}});
        let bytes = to_canonical_bytes(&payload).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"a":{"x":"v","y":1.5},"z":[1,{"a":true,"b":null}]}"#);
    }

    #[rstest]
    #[case("café", r#""caf\u00e9""#)]
    #[case("😀", r#""\ud83d\ude00""#)]
    #[case("line\nbreak\ttab", r#""line\nbreak\ttab""#)]
    #[case("quote\"back\\", r#""quote\"back\\""#)]
    #[case("\u{1}", r#""\u0001""#)]
    #[case("\u{7f}", r#""\u007f""#)]
    fn test_string_escaping(#[case] input: &str, #[case] expected: &str) {
        let bytes = to_canonical_bytes(input).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }
}
