use ciborium::value::Value;

use super::{StatementVerifier, VerifiedAttestation};
use crate::codec::AuthenticatorData;
use crate::crypto::Crypto;
use crate::data::AttestationType;
use crate::error::VerificationError;

/// The `none` format: an explicitly empty statement. Conveys no provenance;
/// the trust step can never mark it trusted.
pub(crate) struct NoneAttestation;

impl StatementVerifier for NoneAttestation {
    fn verify(
        &self,
        att_stmt: &[(Value, Value)],
        _auth_data: &AuthenticatorData,
        _auth_data_bytes: &[u8],
        _client_data_hash: &[u8; 32],
        _crypto: &dyn Crypto,
    ) -> Result<VerifiedAttestation, VerificationError> {
        if !att_stmt.is_empty() {
            return Err(VerificationError::AttestationStatementInvalid(
                "none attestation must carry an empty statement".into(),
            ));
        }
        Ok(VerifiedAttestation {
            attestation_type: AttestationType::None,
            trust_path: Vec::new(),
        })
    }
}
