use ciborium::value::Value;

use super::{CodecError, CosePublicKey};

// Flag bits of the authenticator-data flags byte.
pub const FLAG_UP: u8 = 0x01;
pub const FLAG_UV: u8 = 0x04;
pub const FLAG_AT: u8 = 0x40;
pub const FLAG_ED: u8 = 0x80;

const HEADER_LEN: usize = 37; // rpIdHash(32) + flags(1) + signCount(4)
const ATTESTED_FIXED_LEN: usize = 18; // aaguid(16) + credentialIdLength(2)

/// Attested credential data, present when the AT flag is set.
#[derive(Debug, Clone)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    /// Raw CBOR bytes of the COSE credential public key, exactly as they
    /// appear on the wire (carried through into the registration result).
    pub public_key_cose: Vec<u8>,
    pub public_key: CosePublicKey,
}

/// Parsed authenticator data (fixed binary layout, big-endian integers).
#[derive(Debug, Clone)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub sign_count: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    pub extensions: Option<Value>,
}

impl AuthenticatorData {
    pub fn user_present(&self) -> bool {
        self.flags & FLAG_UP != 0
    }

    pub fn user_verified(&self) -> bool {
        self.flags & FLAG_UV != 0
    }

    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::AuthenticatorData(format!(
                "{} bytes, need at least {HEADER_LEN}",
                data.len()
            )));
        }

        let rp_id_hash: [u8; 32] = data[0..32].try_into().expect("slice length fixed");
        let flags = data[32];
        let sign_count = u32::from_be_bytes(data[33..37].try_into().expect("slice length fixed"));

        let mut offset = HEADER_LEN;
        let attested_credential_data = if flags & FLAG_AT != 0 {
            let (acd, consumed) = parse_attested_credential_data(&data[offset..])?;
            offset += consumed;
            Some(acd)
        } else {
            None
        };

        let extensions = if flags & FLAG_ED != 0 {
            let (value, consumed) = read_cbor_value(&data[offset..])
                .map_err(|e| CodecError::AuthenticatorData(format!("extensions: {e}")))?;
            offset += consumed;
            Some(value)
        } else {
            None
        };

        if offset != data.len() {
            return Err(CodecError::AuthenticatorData(format!(
                "{} trailing bytes",
                data.len() - offset
            )));
        }

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential_data,
            extensions,
        })
    }
}

fn parse_attested_credential_data(
    data: &[u8],
) -> Result<(AttestedCredentialData, usize), CodecError> {
    if data.len() < ATTESTED_FIXED_LEN {
        return Err(CodecError::AuthenticatorData(
            "attested credential data truncated".into(),
        ));
    }
    let aaguid: [u8; 16] = data[0..16].try_into().expect("slice length fixed");
    let id_len = u16::from_be_bytes([data[16], data[17]]) as usize;
    if data.len() < ATTESTED_FIXED_LEN + id_len {
        return Err(CodecError::AuthenticatorData(format!(
            "credential id truncated ({id_len} declared)"
        )));
    }
    let credential_id = data[ATTESTED_FIXED_LEN..ATTESTED_FIXED_LEN + id_len].to_vec();

    let key_start = ATTESTED_FIXED_LEN + id_len;
    let (key_value, key_len) = read_cbor_value(&data[key_start..])
        .map_err(|e| CodecError::AuthenticatorData(format!("credential public key: {e}")))?;
    let public_key = CosePublicKey::from_value(&key_value)?;
    let public_key_cose = data[key_start..key_start + key_len].to_vec();

    Ok((
        AttestedCredentialData {
            aaguid,
            credential_id,
            public_key_cose,
            public_key,
        },
        key_start + key_len,
    ))
}

/// Decode one CBOR value from the front of `data` and report how many bytes
/// it occupied. The COSE key inside authenticator data has no length prefix,
/// so the decoder itself is the only way to find where it ends.
fn read_cbor_value(data: &[u8]) -> Result<(Value, usize), CodecError> {
    let mut reader = CountingReader { data, pos: 0 };
    let value: Value = ciborium::from_reader(&mut reader)
        .map_err(|e: ciborium::de::Error<std::io::Error>| CodecError::Cbor(e.to_string()))?;
    Ok((value, reader.pos))
}

struct CountingReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl std::io::Read for CountingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
