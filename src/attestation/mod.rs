pub mod fido_u2f;
pub mod none;
pub mod packed;
pub mod trust;

pub use trust::MetadataService;

use ciborium::value::Value;
use x509_parser::prelude::*;

use crate::codec::AuthenticatorData;
use crate::crypto::Crypto;
use crate::data::AttestationType;
use crate::error::VerificationError;

/// What a statement verifier establishes about a new credential.
#[derive(Debug, Clone)]
pub struct VerifiedAttestation {
    pub attestation_type: AttestationType,
    /// Certificate chain (DER, leaf first) backing the statement; empty for
    /// self and none attestation.
    pub trust_path: Vec<Vec<u8>>,
}

/// One attestation statement format. A verifier validates its statement's
/// shape and signature; chain trust is assessed separately.
pub(crate) trait StatementVerifier: Send + Sync {
    fn verify(
        &self,
        att_stmt: &[(Value, Value)],
        auth_data: &AuthenticatorData,
        auth_data_bytes: &[u8],
        client_data_hash: &[u8; 32],
        crypto: &dyn Crypto,
    ) -> Result<VerifiedAttestation, VerificationError>;
}

fn verifier_for(fmt: &str) -> Option<&'static dyn StatementVerifier> {
    match fmt {
        "none" => Some(&none::NoneAttestation),
        "packed" => Some(&packed::PackedAttestation),
        "fido-u2f" => Some(&fido_u2f::FidoU2fAttestation),
        _ => None,
    }
}

/// Dispatch on the attestation object's `fmt`. Formats this crate does not
/// know resolve to `Unknown` with an empty trust path, which the trust step
/// will refuse to mark trusted.
pub(crate) fn verify_statement(
    fmt: &str,
    att_stmt: &[(Value, Value)],
    auth_data: &AuthenticatorData,
    auth_data_bytes: &[u8],
    client_data_hash: &[u8; 32],
    crypto: &dyn Crypto,
) -> Result<VerifiedAttestation, VerificationError> {
    match verifier_for(fmt) {
        Some(verifier) => {
            verifier.verify(att_stmt, auth_data, auth_data_bytes, client_data_hash, crypto)
        }
        None => {
            tracing::debug!(fmt, "unknown attestation format");
            Ok(VerifiedAttestation {
                attestation_type: AttestationType::Unknown,
                trust_path: Vec::new(),
            })
        }
    }
}

/// SEC1 point from a DER certificate's SubjectPublicKeyInfo.
pub(crate) fn certificate_public_key_point(der: &[u8]) -> Result<Vec<u8>, VerificationError> {
    let (_, cert) = parse_x509_certificate(der).map_err(|e| {
        VerificationError::AttestationStatementInvalid(format!("attestation certificate: {e}"))
    })?;
    Ok(cert
        .tbs_certificate
        .subject_pki
        .subject_public_key
        .data
        .to_vec())
}

/// Pull the `x5c` certificate list out of an attestation statement.
pub(crate) fn statement_x5c(
    att_stmt: &[(Value, Value)],
) -> Result<Option<Vec<Vec<u8>>>, VerificationError> {
    use crate::codec::cbor;
    let Some(value) = cbor::get_text_key(att_stmt, "x5c") else {
        return Ok(None);
    };
    let certs = cbor::as_array(value).ok_or_else(|| {
        VerificationError::AttestationStatementInvalid("x5c is not an array".into())
    })?;
    let mut out = Vec::with_capacity(certs.len());
    for cert in certs {
        let der = cbor::as_bytes(cert).ok_or_else(|| {
            VerificationError::AttestationStatementInvalid("x5c entry is not bytes".into())
        })?;
        out.push(der.to_vec());
    }
    if out.is_empty() {
        return Err(VerificationError::AttestationStatementInvalid(
            "x5c is empty".into(),
        ));
    }
    Ok(Some(out))
}
