//! Normalization of `/complaints` payloads into a flat record list.

use serde_json::{Map, Value};

/// Envelope keys that stop an object from being read as a record.
const ENVELOPE_KEYS: [&str; 3] = ["store", "excel", "results"];

/// Accepted shapes of a claims payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimsShape {
    /// A plain array of records.
    Records(Vec<Value>),
    /// `{store: [...], excel: [...]}`, either side optional.
    Sources { store: Vec<Value>, excel: Vec<Value> },
    /// A single record object.
    Single(Map<String, Value>),
    /// Anything else.
    Unrecognized,
}

impl ClaimsShape {
    /// Decide which shape `payload` has. A `{results: X}` envelope is
    /// unwrapped first.
    pub fn classify(payload: &Value) -> Self {
        match payload {
            Value::Array(items) => ClaimsShape::Records(items.clone()),
            Value::Object(map) => {
                if let Some(inner) = map.get("results") {
                    return ClaimsShape::classify(inner);
                }

                let store = map.get("store").and_then(Value::as_array);
                let excel = map.get("excel").and_then(Value::as_array);
                if store.is_some() || excel.is_some() {
                    return ClaimsShape::Sources {
                        store: store.cloned().unwrap_or_default(),
                        excel: excel.cloned().unwrap_or_default(),
                    };
                }

                if is_bare_record(map) {
                    ClaimsShape::Single(map.clone())
                } else {
                    ClaimsShape::Unrecognized
                }
            }
            _ => ClaimsShape::Unrecognized,
        }
    }

    /// Flatten into records. Store rows come before excel rows.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            ClaimsShape::Records(records) => records,
            ClaimsShape::Sources { mut store, excel } => {
                store.extend(excel);
                store
            }
            ClaimsShape::Single(map) => vec![Value::Object(map)],
            ClaimsShape::Unrecognized => Vec::new(),
        }
    }
}

/// Records from one payload, with the payload kept when it was not understood.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedClaims {
    pub records: Vec<Value>,
    pub raw: Option<Value>,
}

/// Normalize one `/complaints` payload.
pub fn normalize(payload: Value) -> NormalizedClaims {
    match ClaimsShape::classify(&payload) {
        ClaimsShape::Unrecognized => NormalizedClaims {
            records: Vec::new(),
            raw: Some(payload),
        },
        shape => NormalizedClaims {
            records: shape.into_records(),
            raw: None,
        },
    }
}

/// Non-empty, no envelope keys, and at least one string or number value.
fn is_bare_record(map: &Map<String, Value>) -> bool {
    if map.is_empty() || ENVELOPE_KEYS.iter().any(|key| map.contains_key(*key)) {
        return false;
    }

    map.values()
        .any(|v| matches!(v, Value::String(_) | Value::Number(_)))
}
