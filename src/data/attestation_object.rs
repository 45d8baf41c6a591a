use ciborium::value::Value;

use crate::codec::{cbor, AuthenticatorData, CodecError};

/// Decoded `attestationObject`: a CBOR map with text keys `fmt`, `authData`,
/// `attStmt`. The authenticator-data bytes are kept alongside the parsed
/// form because attestation signatures cover the raw octets.
#[derive(Debug, Clone)]
pub struct AttestationObject {
    pub fmt: String,
    pub auth_data_bytes: Vec<u8>,
    pub auth_data: AuthenticatorData,
    pub att_stmt: Vec<(Value, Value)>,
}

impl AttestationObject {
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let map = cbor::parse_map(data)?;

        let fmt = cbor::get_text_key(&map, "fmt")
            .and_then(cbor::as_text)
            .ok_or_else(|| CodecError::Cbor("attestationObject: missing fmt".into()))?
            .to_string();

        let auth_data_bytes = cbor::get_text_key(&map, "authData")
            .and_then(cbor::as_bytes)
            .ok_or_else(|| CodecError::Cbor("attestationObject: missing authData".into()))?
            .to_vec();

        let att_stmt = cbor::get_text_key(&map, "attStmt")
            .and_then(cbor::as_map)
            .ok_or_else(|| CodecError::Cbor("attestationObject: missing attStmt".into()))?
            .to_vec();

        let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;

        Ok(Self { fmt, auth_data_bytes, auth_data, att_stmt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn sample_auth_data() -> Vec<u8> {
        let rp_id_hash: [u8; 32] = Sha256::digest(b"localhost").into();
        let mut data = Vec::new();
        data.extend_from_slice(&rp_id_hash);
        data.push(0x41); // UP | AT
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(b"id");
        let key = Value::Map(vec![
            (Value::Integer(1i64.into()), Value::Integer(2i64.into())),
            (Value::Integer(3i64.into()), Value::Integer((-7i64).into())),
            (Value::Integer((-1i64).into()), Value::Integer(1i64.into())),
            (Value::Integer((-2i64).into()), Value::Bytes(vec![0x11; 32])),
            (Value::Integer((-3i64).into()), Value::Bytes(vec![0x22; 32])),
        ]);
        ciborium::into_writer(&key, &mut data).unwrap();
        data
    }

    fn encode_object(fmt: &str, auth_data: &[u8]) -> Vec<u8> {
        let map = Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text(fmt.into())),
            (Value::Text("authData".into()), Value::Bytes(auth_data.to_vec())),
            (Value::Text("attStmt".into()), Value::Map(vec![])),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_decode() {
        let auth_data = sample_auth_data();
        let object = AttestationObject::decode(&encode_object("none", &auth_data)).unwrap();
        assert_eq!(object.fmt, "none");
        assert_eq!(object.auth_data_bytes, auth_data);
        assert!(object.att_stmt.is_empty());
        assert!(object.auth_data.attested_credential_data.is_some());
    }

    #[test]
    fn test_missing_fmt() {
        let map = Value::Map(vec![(
            Value::Text("authData".into()),
            Value::Bytes(sample_auth_data()),
        )]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).unwrap();
        assert!(AttestationObject::decode(&buf).is_err());
    }

    #[test]
    fn test_bad_auth_data_propagates() {
        assert!(AttestationObject::decode(&encode_object("none", &[0u8; 10])).is_err());
    }
}
