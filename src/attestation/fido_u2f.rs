use ciborium::value::Value;

use super::{certificate_public_key_point, statement_x5c, StatementVerifier, VerifiedAttestation};
use crate::codec::{cbor, AuthenticatorData};
use crate::crypto::Crypto;
use crate::data::AttestationType;
use crate::error::VerificationError;

/// The `fido-u2f` format: a legacy U2F registration signature made by the
/// attestation certificate over the U2F registration signing base.
pub(crate) struct FidoU2fAttestation;

impl StatementVerifier for FidoU2fAttestation {
    fn verify(
        &self,
        att_stmt: &[(Value, Value)],
        auth_data: &AuthenticatorData,
        _auth_data_bytes: &[u8],
        client_data_hash: &[u8; 32],
        crypto: &dyn Crypto,
    ) -> Result<VerifiedAttestation, VerificationError> {
        let chain = statement_x5c(att_stmt)?.ok_or_else(|| {
            VerificationError::AttestationStatementInvalid("missing x5c".into())
        })?;
        let signature = cbor::get_text_key(att_stmt, "sig")
            .and_then(cbor::as_bytes)
            .ok_or_else(|| {
                VerificationError::AttestationStatementInvalid("missing sig".into())
            })?;

        let credential = auth_data.attested_credential_data.as_ref().ok_or_else(|| {
            VerificationError::AttestationStatementInvalid("no attested credential data".into())
        })?;

        let signing_base = u2f_signing_base(
            &auth_data.rp_id_hash,
            client_data_hash,
            &credential.credential_id,
            &credential.public_key.to_sec1_uncompressed(),
        );

        let point = certificate_public_key_point(&chain[0])?;
        if !crypto.verify_sec1_p256(&point, &signing_base, signature) {
            return Err(VerificationError::AttestationStatementInvalid(
                "U2F registration signature does not verify".into(),
            ));
        }

        Ok(VerifiedAttestation {
            attestation_type: AttestationType::Basic,
            trust_path: chain,
        })
    }
}

/// U2F raw registration signing base:
/// `0x00 || rpIdHash || clientDataHash || credentialId || publicKeyU2F`.
pub(crate) fn u2f_signing_base(
    rp_id_hash: &[u8; 32],
    client_data_hash: &[u8; 32],
    credential_id: &[u8],
    public_key_u2f: &[u8],
) -> Vec<u8> {
    let mut base = Vec::with_capacity(1 + 32 + 32 + credential_id.len() + public_key_u2f.len());
    base.push(0x00);
    base.extend_from_slice(rp_id_hash);
    base.extend_from_slice(client_data_hash);
    base.extend_from_slice(credential_id);
    base.extend_from_slice(public_key_u2f);
    base
}
