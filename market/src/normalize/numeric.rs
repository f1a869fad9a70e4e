use serde_json::Value;

/// Coerces a JSON value into a finite `f64`.
///
/// Strings may carry display decoration (`"$12.34"`, `"+5.20%"`, `"1,234"`);
/// it is stripped before parsing. Anything unparseable is `None`.
pub fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_decorated(s),
        _ => None,
    }
}

pub fn parse_decorated(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | '+') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn strips_currency_percent_and_thousands() {
        assert_eq!(parse_decorated("$12.34"), Some(12.34));
        assert_eq!(parse_decorated("+5.20%"), Some(5.20));
        assert_eq!(parse_decorated("1,234"), Some(1234.0));
        assert_eq!(parse_decorated("-3.10%"), Some(-3.10));
        assert_eq!(parse_decorated(" $1,234,567.5 "), Some(1_234_567.5));
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_decorated("N/A"), None);
        assert_eq!(parse_decorated(""), None);
        assert_eq!(parse_decorated("%"), None);
        assert_eq!(parse_decorated("NaN"), None);
        assert_eq!(parse_decorated("inf"), None);
    }

    #[test]
    fn json_numbers_and_non_numbers() {
        assert_eq!(coerce_f64(&json!(42)), Some(42.0));
        assert_eq!(coerce_f64(&json!(-1.5)), Some(-1.5));
        assert_eq!(coerce_f64(&json!(true)), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!([1])), None);
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(s in ".*") {
            let _ = parse_decorated(&s);
        }

        #[test]
        fn decorated_integers_round_trip(n in 0u64..10_000_000_000u64) {
            let decorated = format!("${}", with_thousands(n));
            prop_assert_eq!(parse_decorated(&decorated), Some(n as f64));
        }
    }

    fn with_thousands(n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::new();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}
