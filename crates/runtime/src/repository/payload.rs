//! Dotted-path access into item payloads.
//!
//! Item data is an untyped JSON tree. Quantities and direct modifier patches
//! address it with plain dotted keys such as `system.damage.bonus`.

use serde_json::{Map, Number, Value};

use craft_core::{ChangeMode, ChangeValue};

pub fn get_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |node, segment| node.as_object()?.get(segment))
}

/// Integer at `path`, accepting integral floats.
pub fn get_i64(data: &Value, path: &str) -> Option<i64> {
    let value = get_path(data, path)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

/// Writes `value` at `path`, creating missing intermediate objects.
///
/// A non-object node on the way is replaced by an object.
pub fn set_path(data: &mut Value, path: &str, value: Value) {
    let mut node = data;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

pub fn to_json(value: &ChangeValue) -> Value {
    match value {
        ChangeValue::Flag(flag) => Value::Bool(*flag),
        ChangeValue::Number(number) => Value::from(*number),
        ChangeValue::Float(number) => Value::from(*number),
        ChangeValue::Text(text) => Value::String(text.clone()),
    }
}

/// Applies one property change at `key`.
///
/// A missing current value is written as-is under every mode. Incompatible
/// operands (e.g. multiplying a string) leave the value unchanged. Returns
/// whether the payload changed.
pub fn apply_change(data: &mut Value, key: &str, mode: ChangeMode, change: &ChangeValue) -> bool {
    let incoming = to_json(change);
    let next = match get_path(data, key) {
        None | Some(Value::Null) => match mode {
            ChangeMode::Custom => None,
            _ => Some(incoming),
        },
        Some(current) => combine(current, &incoming, mode),
    };
    match next {
        Some(value) => {
            set_path(data, key, value);
            true
        }
        None => false,
    }
}

fn combine(current: &Value, incoming: &Value, mode: ChangeMode) -> Option<Value> {
    match mode {
        ChangeMode::Custom => None,
        ChangeMode::Override => Some(incoming.clone()),
        ChangeMode::Add => match (current, incoming) {
            (Value::String(a), b) => Some(Value::String(format!("{a}{}", display(b)))),
            (Value::Number(a), Value::Number(b)) => arithmetic(a, b, i64::checked_add, |x, y| x + y),
            _ => None,
        },
        ChangeMode::Multiply => match (current, incoming) {
            (Value::Number(a), Value::Number(b)) => arithmetic(a, b, i64::checked_mul, |x, y| x * y),
            _ => None,
        },
        ChangeMode::Upgrade => match (current, incoming) {
            (Value::Number(a), Value::Number(b)) => arithmetic(a, b, |x, y| Some(x.max(y)), f64::max),
            _ => None,
        },
        ChangeMode::Downgrade => match (current, incoming) {
            (Value::Number(a), Value::Number(b)) => arithmetic(a, b, |x, y| Some(x.min(y)), f64::min),
            _ => None,
        },
    }
}

fn arithmetic(
    a: &Number,
    b: &Number,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Option<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64())
        && let Some(result) = int_op(x, y)
    {
        return Some(Value::from(result));
    }
    let (x, y) = (a.as_f64()?, b.as_f64()?);
    Number::from_f64(float_op(x, y)).map(Value::Number)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fractional_changes_use_float_arithmetic() {
        let mut data = json!({ "weight": 4, "price": 2.5 });
        assert!(apply_change(&mut data, "weight", ChangeMode::Multiply, &ChangeValue::Float(1.5)));
        assert!(apply_change(&mut data, "price", ChangeMode::Add, &ChangeValue::Number(1)));
        assert_eq!(data["weight"], json!(6.0));
        assert_eq!(data["price"], json!(3.5));
    }

    #[test]
    fn get_and_set_dotted_paths() {
        let mut data = json!({ "system": { "quantity": 3 } });
        assert_eq!(get_i64(&data, "system.quantity"), Some(3));
        assert_eq!(get_path(&data, "system.missing"), None);

        set_path(&mut data, "system.damage.bonus", json!(2));
        assert_eq!(data["system"]["damage"]["bonus"], json!(2));
        assert_eq!(data["system"]["quantity"], json!(3));
    }

    #[test]
    fn change_modes_combine_with_current_value() {
        let mut data = json!({ "a": 4, "b": 4, "c": 4, "d": 4, "name": "Blade" });

        apply_change(&mut data, "a", ChangeMode::Add, &ChangeValue::Number(2));
        apply_change(&mut data, "b", ChangeMode::Multiply, &ChangeValue::Number(3));
        apply_change(&mut data, "c", ChangeMode::Upgrade, &ChangeValue::Number(9));
        apply_change(&mut data, "d", ChangeMode::Downgrade, &ChangeValue::Number(1));
        apply_change(&mut data, "name", ChangeMode::Add, &ChangeValue::Text(" of Fire".into()));

        assert_eq!(data, json!({ "a": 6, "b": 12, "c": 9, "d": 1, "name": "Blade of Fire" }));
    }

    #[test]
    fn custom_mode_is_never_applied() {
        let mut data = json!({ "a": 1 });
        assert!(!apply_change(&mut data, "a", ChangeMode::Custom, &ChangeValue::Number(5)));
        assert!(!apply_change(&mut data, "b", ChangeMode::Custom, &ChangeValue::Number(5)));
        assert_eq!(data, json!({ "a": 1 }));
    }

    #[test]
    fn missing_value_is_written_as_is() {
        let mut data = json!({});
        assert!(apply_change(&mut data, "system.weight", ChangeMode::Multiply, &ChangeValue::Number(2)));
        assert_eq!(data, json!({ "system": { "weight": 2 } }));
    }
}
