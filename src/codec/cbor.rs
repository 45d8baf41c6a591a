use ciborium::value::Value;

use super::CodecError;

/// Decode a single CBOR value that must be a map.
pub(crate) fn parse_map(data: &[u8]) -> Result<Vec<(Value, Value)>, CodecError> {
    let value: Value =
        ciborium::from_reader(data).map_err(|e| CodecError::Cbor(e.to_string()))?;
    match value {
        Value::Map(map) => Ok(map),
        _ => Err(CodecError::Cbor("expected map".into())),
    }
}

/// Encode a value back to bytes. Well-formed canonical input round-trips
/// byte-identically because `Value` maps preserve entry order.
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::Cbor(e.to_string()))?;
    Ok(buf)
}

pub(crate) fn get_text_key<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
        .map(|(_, v)| v)
}

pub(crate) fn get_int_key<'a>(map: &'a [(Value, Value)], key: i64) -> Option<&'a Value> {
    let target = Value::Integer(key.into());
    map.iter().find(|(k, _)| k == &target).map(|(_, v)| v)
}

pub(crate) fn as_bytes(v: &Value) -> Option<&[u8]> {
    match v {
        Value::Bytes(b) => Some(b),
        _ => None,
    }
}

pub(crate) fn as_text(v: &Value) -> Option<&str> {
    match v {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

pub(crate) fn as_map(v: &Value) -> Option<&[(Value, Value)]> {
    match v {
        Value::Map(m) => Some(m),
        _ => None,
    }
}

pub(crate) fn as_array(v: &Value) -> Option<&[Value]> {
    match v {
        Value::Array(a) => Some(a),
        _ => None,
    }
}

pub(crate) fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => i64::try_from(i128::from(*i)).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> Value {
        Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text("none".into())),
            (Value::Text("authData".into()), Value::Bytes(vec![1, 2, 3])),
            (Value::Text("attStmt".into()), Value::Map(vec![])),
            (Value::Integer(3i64.into()), Value::Integer((-7i64).into())),
        ])
    }

    #[test]
    fn test_map_accessors() {
        let encoded = encode(&sample_map()).unwrap();
        let map = parse_map(&encoded).unwrap();
        assert_eq!(get_text_key(&map, "fmt").and_then(as_text), Some("none"));
        assert_eq!(
            get_text_key(&map, "authData").and_then(as_bytes),
            Some(&[1u8, 2, 3][..])
        );
        assert!(get_text_key(&map, "attStmt").and_then(as_map).unwrap().is_empty());
        assert_eq!(get_int_key(&map, 3).and_then(as_i64), Some(-7));
        assert!(get_text_key(&map, "missing").is_none());
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let encoded = encode(&sample_map()).unwrap();
        let value: Value = ciborium::from_reader(encoded.as_slice()).unwrap();
        assert_eq!(encode(&value).unwrap(), encoded);
    }

    #[test]
    fn test_non_map_rejected() {
        let encoded = encode(&Value::Bytes(vec![0u8; 4])).unwrap();
        assert!(parse_map(&encoded).is_err());
    }
}
