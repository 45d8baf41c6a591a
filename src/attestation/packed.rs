use ciborium::value::Value;

use super::{certificate_public_key_point, statement_x5c, StatementVerifier, VerifiedAttestation};
use crate::codec::{cbor, AuthenticatorData, CoseAlgorithm};
use crate::crypto::Crypto;
use crate::data::AttestationType;
use crate::error::VerificationError;

/// The `packed` format. With an `x5c` chain the leaf certificate signed
/// `authData || clientDataHash` (Basic attestation); without one the
/// credential key itself did (Self attestation). ECDAA is not supported.
pub(crate) struct PackedAttestation;

impl StatementVerifier for PackedAttestation {
    fn verify(
        &self,
        att_stmt: &[(Value, Value)],
        auth_data: &AuthenticatorData,
        auth_data_bytes: &[u8],
        client_data_hash: &[u8; 32],
        crypto: &dyn Crypto,
    ) -> Result<VerifiedAttestation, VerificationError> {
        if cbor::get_text_key(att_stmt, "ecdaaKeyId").is_some() {
            return Err(VerificationError::AttestationFormatUnsupported(
                "packed (ECDAA)".into(),
            ));
        }

        let alg = cbor::get_text_key(att_stmt, "alg")
            .and_then(cbor::as_i64)
            .ok_or_else(|| {
                VerificationError::AttestationStatementInvalid("missing alg".into())
            })?;
        let signature = cbor::get_text_key(att_stmt, "sig")
            .and_then(cbor::as_bytes)
            .ok_or_else(|| {
                VerificationError::AttestationStatementInvalid("missing sig".into())
            })?;

        let mut message = Vec::with_capacity(auth_data_bytes.len() + client_data_hash.len());
        message.extend_from_slice(auth_data_bytes);
        message.extend_from_slice(client_data_hash);

        match statement_x5c(att_stmt)? {
            Some(chain) => {
                if CoseAlgorithm::from(alg) != CoseAlgorithm::Es256 {
                    return Err(VerificationError::AttestationStatementInvalid(format!(
                        "unsupported alg {alg}"
                    )));
                }
                let point = certificate_public_key_point(&chain[0])?;
                if !crypto.verify_sec1_p256(&point, &message, signature) {
                    return Err(VerificationError::AttestationStatementInvalid(
                        "signature does not verify with attestation certificate".into(),
                    ));
                }
                Ok(VerifiedAttestation {
                    attestation_type: AttestationType::Basic,
                    trust_path: chain,
                })
            }
            None => {
                let credential = auth_data
                    .attested_credential_data
                    .as_ref()
                    .ok_or_else(|| {
                        VerificationError::AttestationStatementInvalid(
                            "no attested credential data".into(),
                        )
                    })?;
                if alg != credential.public_key.algorithm().id() {
                    return Err(VerificationError::AttestationStatementInvalid(format!(
                        "alg {alg} does not match the credential key"
                    )));
                }
                if !crypto.verify_cose(&credential.public_key, &message, signature) {
                    return Err(VerificationError::AttestationStatementInvalid(
                        "self-attestation signature does not verify".into(),
                    ));
                }
                Ok(VerifiedAttestation {
                    attestation_type: AttestationType::SelfAttestation,
                    trust_path: Vec::new(),
                })
            }
        }
    }
}
