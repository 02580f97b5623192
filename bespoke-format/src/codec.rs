use std::collections::BTreeMap;

use serde_json::Value;

use crate::ReadError;

/// Name of the archive entry holding the encoded map.
pub const MAP_ENTRY_NAME: &str = ".bespoke.json";

/// The key/value payload embedded by [`with_map`](crate::with_map).
pub type PayloadMap = BTreeMap<String, String>;

/// Encodes `map` as a JSON object. Keys are emitted in sorted order, so equal
/// maps always encode to equal bytes.
pub fn encode(map: &PayloadMap) -> Vec<u8> {
    let object = map
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect::<serde_json::Map<_, _>>();

    Value::Object(object).to_string().into_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<PayloadMap, ReadError> {
    serde_json::from_slice(bytes).map_err(ReadError::MalformedMap)
}
