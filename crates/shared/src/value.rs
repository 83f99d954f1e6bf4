use serde::{Deserialize, Serialize};

/// A table value as it travels on the wire and lives in the local cache.
///
/// The variant set is closed: every remote entry is a boolean, a number, or
/// text. Untagged serde keeps the JSON natural (`true`, `12.5`, `"abc"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// The kind of editable control backing a table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Boolean,
    Number,
    Text,
}

impl Value {
    /// Normalizes string-encoded booleans delivered by the wire.
    ///
    /// Some table servers pass booleans as the literal strings `"true"` and
    /// `"false"`. Applying this to an already-boolean value is a no-op, so
    /// the coercion is idempotent.
    pub fn coerce(self) -> Value {
        match self {
            Value::Text(text) if text == "true" => Value::Bool(true),
            Value::Text(text) if text == "false" => Value::Bool(false),
            other => other,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Numeric reading of the value, using the same strict full-string parse
    /// the classifier applies to text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(_) => None,
            Value::Number(number) => Some(*number),
            Value::Text(text) => text.parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Textual rendering for display in a text-style control.
    pub fn display_string(&self) -> String {
        match self {
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => format_number(*number),
            Value::Text(text) => text.clone(),
        }
    }
}

/// Integral values render without a trailing `.0` so a numeric control shows
/// `12`, not `12.0`.
fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

impl ControlKind {
    /// Classifies a coerced value into the control kind that should back it.
    ///
    /// The order matters: booleans first (a numeric-looking boolean cannot
    /// occur post-coercion), then a strict full-string finite numeric parse,
    /// then text. `""` and `"1.2.3"` are text, never degenerate numbers.
    pub fn classify(value: &Value) -> ControlKind {
        match value {
            Value::Bool(_) => ControlKind::Boolean,
            Value::Number(_) => ControlKind::Number,
            Value::Text(text) => match text.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => ControlKind::Number,
                _ => ControlKind::Text,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_literal_boolean_strings() {
        assert_eq!(Value::Text("true".into()).coerce(), Value::Bool(true));
        assert_eq!(Value::Text("false".into()).coerce(), Value::Bool(false));
        assert_eq!(Value::Text("True".into()).coerce(), Value::Text("True".into()));
        assert_eq!(Value::Number(1.0).coerce(), Value::Number(1.0));
    }

    #[test]
    fn coercion_is_idempotent() {
        let samples = [
            Value::Text("true".into()),
            Value::Text("false".into()),
            Value::Bool(true),
            Value::Number(42.0),
            Value::Text("abc".into()),
            Value::Text(String::new()),
        ];
        for sample in samples {
            let once = sample.clone().coerce();
            assert_eq!(once.clone().coerce(), once);
        }
    }

    #[test]
    fn classification_is_total_and_ordered() {
        assert_eq!(ControlKind::classify(&Value::Bool(true)), ControlKind::Boolean);
        assert_eq!(
            ControlKind::classify(&Value::Text("42".into())),
            ControlKind::Number
        );
        assert_eq!(ControlKind::classify(&Value::Number(3.5)), ControlKind::Number);
        assert_eq!(
            ControlKind::classify(&Value::Text(String::new())),
            ControlKind::Text
        );
        assert_eq!(
            ControlKind::classify(&Value::Text("abc".into())),
            ControlKind::Text
        );
    }

    #[test]
    fn strict_numeric_parse_rejects_partial_numbers() {
        for text in ["12abc", " 42", "1.2.3", "0x10"] {
            assert_eq!(
                ControlKind::classify(&Value::Text(text.into())),
                ControlKind::Text,
                "{text:?} must classify as text"
            );
        }
        for text in ["-3.5", "1e3", "0"] {
            assert_eq!(
                ControlKind::classify(&Value::Text(text.into())),
                ControlKind::Number,
                "{text:?} must classify as number"
            );
        }
    }

    #[test]
    fn renders_integral_numbers_without_fraction() {
        assert_eq!(Value::Number(12.0).display_string(), "12");
        assert_eq!(Value::Number(-7.0).display_string(), "-7");
        assert_eq!(Value::Number(2.5).display_string(), "2.5");
        assert_eq!(Value::Bool(true).display_string(), "true");
    }

    #[test]
    fn wire_values_deserialize_untagged() {
        assert_eq!(
            serde_json::from_str::<Value>("true").expect("bool"),
            Value::Bool(true)
        );
        assert_eq!(
            serde_json::from_str::<Value>("12.5").expect("number"),
            Value::Number(12.5)
        );
        assert_eq!(
            serde_json::from_str::<Value>("\"true\"").expect("text"),
            Value::Text("true".into())
        );
    }
}
