use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use super::{cbor, CodecError};

// COSE_Key labels (RFC 8152 §7 / §13.1).
const KTY: i64 = 1;
const ALG: i64 = 3;
const CRV: i64 = -1;
const X: i64 = -2;
const Y: i64 = -3;

const KTY_EC2: i64 = 2;
const CRV_P256: i64 = 1;

/// COSE algorithm identifier carried in credential parameters and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum CoseAlgorithm {
    /// ECDSA on P-256 with SHA-256 (-7).
    Es256,
    /// Anything this crate cannot verify.
    Other(i64),
}

impl CoseAlgorithm {
    pub fn id(self) -> i64 {
        match self {
            Self::Es256 => -7,
            Self::Other(id) => id,
        }
    }
}

impl From<i64> for CoseAlgorithm {
    fn from(id: i64) -> Self {
        match id {
            -7 => Self::Es256,
            other => Self::Other(other),
        }
    }
}

impl From<CoseAlgorithm> for i64 {
    fn from(alg: CoseAlgorithm) -> i64 {
        alg.id()
    }
}

/// A credential public key decoded from its COSE_Key map.
///
/// EC2 on P-256 is the minimum the 2018-03-20 CR requires of a relying
/// party; other key types surface as decode errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosePublicKey {
    Es256 { x: [u8; 32], y: [u8; 32] },
}

impl CosePublicKey {
    pub fn algorithm(&self) -> CoseAlgorithm {
        match self {
            Self::Es256 { .. } => CoseAlgorithm::Es256,
        }
    }

    /// Uncompressed SEC1 point (`0x04 || x || y`), the form the U2F
    /// registration signing base embeds.
    pub fn to_sec1_uncompressed(&self) -> Vec<u8> {
        match self {
            Self::Es256 { x, y } => {
                let mut out = Vec::with_capacity(65);
                out.push(0x04);
                out.extend_from_slice(x);
                out.extend_from_slice(y);
                out
            }
        }
    }

    /// Decode from raw CBOR bytes.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let value: Value =
            ciborium::from_reader(data).map_err(|e| CodecError::Cbor(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Decode from an already-parsed CBOR value.
    pub fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = cbor::as_map(value).ok_or_else(|| CodecError::CoseKey("not a map".into()))?;

        let kty = cbor::get_int_key(map, KTY)
            .and_then(cbor::as_i64)
            .ok_or_else(|| CodecError::CoseKey("missing kty".into()))?;
        if kty != KTY_EC2 {
            return Err(CodecError::CoseKey(format!("unsupported kty {kty}")));
        }

        let alg = cbor::get_int_key(map, ALG)
            .and_then(cbor::as_i64)
            .ok_or_else(|| CodecError::CoseKey("missing alg".into()))?;
        if CoseAlgorithm::from(alg) != CoseAlgorithm::Es256 {
            return Err(CodecError::CoseKey(format!("unsupported alg {alg}")));
        }

        let crv = cbor::get_int_key(map, CRV)
            .and_then(cbor::as_i64)
            .ok_or_else(|| CodecError::CoseKey("missing crv".into()))?;
        if crv != CRV_P256 {
            return Err(CodecError::CoseKey(format!("unsupported crv {crv}")));
        }

        let x = coordinate(map, X, "x")?;
        let y = coordinate(map, Y, "y")?;
        Ok(Self::Es256 { x, y })
    }
}

fn coordinate(map: &[(Value, Value)], key: i64, name: &str) -> Result<[u8; 32], CodecError> {
    let bytes = cbor::get_int_key(map, key)
        .and_then(cbor::as_bytes)
        .ok_or_else(|| CodecError::CoseKey(format!("missing {name} coordinate")))?;
    bytes
        .try_into()
        .map_err(|_| CodecError::CoseKey(format!("{name} coordinate is {} bytes", bytes.len())))
}
