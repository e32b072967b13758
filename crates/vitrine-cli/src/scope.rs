//! Parsing of `--scope name=json` bindings.

use anyhow::bail;
use vitrine_markup::Value;

/// Parse one `name=json` binding.
///
/// The value is parsed as JSON; anything that is not valid JSON is taken as a
/// bare string, so `--scope name=Ada` works without shell-quoted quotes.
pub fn parse_binding(binding: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, raw)) = binding.split_once('=') else {
        bail!("scope binding `{binding}` is not of the form name=json");
    };
    if name.is_empty() {
        bail!("scope binding `{binding}` has an empty name");
    }
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::from(raw),
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_parse() {
        let (name, value) = parse_binding("count=3").unwrap();
        assert_eq!(name, "count");
        assert!(matches!(value, Value::Number(n) if n == 3.0));

        let (_, value) = parse_binding(r#"user={"role":"admin"}"#).unwrap();
        assert!(matches!(value, Value::Object(_)));
    }

    #[test]
    fn unquoted_text_becomes_a_string() {
        let (name, value) = parse_binding("name=Ada").unwrap();
        assert_eq!(name, "name");
        assert!(matches!(value, Value::Str(s) if s == "Ada"));
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let (_, value) = parse_binding("query=a=b").unwrap();
        assert!(matches!(value, Value::Str(s) if s == "a=b"));
    }

    #[test]
    fn malformed_bindings_are_rejected() {
        assert!(parse_binding("no-equals").is_err());
        assert!(parse_binding("=3").is_err());
    }
}
