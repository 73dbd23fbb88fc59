use serde_json::{Map, Value};

/// Keys that wrap a collection inside an envelope object, in precedence order.
pub const ENVELOPE_KEYS: [&str; 3] = ["data", "items", "results"];

/// Shape of a parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Top-level JSON array.
    Collection(Vec<Value>),
    /// Object with a list under one of the envelope keys.
    Envelope { key: &'static str, items: Vec<Value> },
    /// Any other object, treated as a single item.
    Single(Map<String, Value>),
    /// Scalars and null carry no items.
    Scalar(Value),
}

impl Payload {
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Array(items) => Payload::Collection(items),
            Value::Object(mut object) => {
                let key = ENVELOPE_KEYS
                    .iter()
                    .copied()
                    .find(|key| matches!(object.get(*key), Some(Value::Array(_))));

                match key.and_then(|key| object.remove(key).map(|items| (key, items))) {
                    Some((key, Value::Array(items))) => Payload::Envelope { key, items },
                    _ => Payload::Single(object),
                }
            }
            other => Payload::Scalar(other),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Payload::Collection(items) | Payload::Envelope { items, .. } => items,
            Payload::Single(object) => vec![Value::Object(object)],
            Payload::Scalar(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_is_collection() {
        let payload = Payload::classify(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(payload.into_items(), vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn test_envelope_precedence() {
        let payload = Payload::classify(json!({
            "results": [{"id": 3}],
            "items": [{"id": 2}],
            "data": [{"id": 1}]
        }));
        assert!(matches!(payload, Payload::Envelope { key: "data", .. }));
        assert_eq!(payload.into_items(), vec![json!({"id": 1})]);

        let payload = Payload::classify(json!({"results": [{"id": 3}], "items": [{"id": 2}]}));
        assert_eq!(payload.into_items(), vec![json!({"id": 2})]);
    }

    #[test]
    fn test_non_list_envelope_key_is_skipped() {
        let payload = Payload::classify(json!({"data": {"id": 1}, "results": [{"id": 9}]}));
        assert_eq!(payload.into_items(), vec![json!({"id": 9})]);
    }

    #[test]
    fn test_plain_object_becomes_single_item() {
        let body = json!({"id": 1, "data": "not a list"});
        let payload = Payload::classify(body.clone());
        assert!(matches!(payload, Payload::Single(_)));
        assert_eq!(payload.into_items(), vec![body]);
    }

    #[test]
    fn test_scalars_are_empty() {
        for body in [json!(true), json!(5), json!("x"), Value::Null] {
            assert!(Payload::classify(body).into_items().is_empty());
        }
    }
}
