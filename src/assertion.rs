use crate::codec::{AuthenticatorData, CosePublicKey};
use crate::crypto::Crypto;
use crate::data::{
    AssertionResponse, AssertionResult, CollectedClientData, PublicKeyCredential, RequestOptions,
};
use crate::error::{Result, VerificationError};
use crate::repository::{CredentialRepository, RegisteredCredential};
use crate::rp::RpConfig;

/// One assertion ceremony. Mirrors the registration chain's shape: each
/// numbered step is a named method, `run` folds them in order, and the
/// first failure is the ceremony's result.
pub(crate) struct AssertionCeremony<'a> {
    pub config: &'a RpConfig,
    pub crypto: &'a dyn Crypto,
    pub repository: &'a dyn CredentialRepository,
    pub request: &'a RequestOptions,
    pub response: &'a PublicKeyCredential<AssertionResponse>,
    pub caller_token_binding_id: Option<&'a str>,
}

impl AssertionCeremony<'_> {
    pub fn run(&self, user_handle: impl FnOnce() -> Option<Vec<u8>>) -> Result<AssertionResult> {
        let mut warnings = Vec::new();

        // 1. Resolve the registered public key
        let credential = self.resolve_credential(user_handle)?;

        // 2. Required response fields
        self.verify_response_fields()?;

        // 3. Parse clientDataJSON
        let client_data = self.parse_client_data()?;

        // 4. Type attribute
        client_data.verify_type(self.config.validate_type_attribute, "webauthn.get")?;

        // 5. Challenge
        self.verify_challenge(&client_data)?;

        // 6. Origin
        client_data.verify_origin(&self.config.origins)?;

        // 7. Token binding
        client_data
            .verify_token_binding(self.caller_token_binding_id, self.config.allow_missing_token_binding)?;

        // 8. Echoed extensions must have been requested
        client_data.verify_extension_subset(self.request.extensions.as_ref())?;

        // 9. rpIdHash
        let auth_data = self.parse_authenticator_data()?;
        self.verify_rp_id_hash(&auth_data)?;

        // 10. clientDataHash
        let client_data_hash = self.client_data_hash(&client_data)?;

        // 11. Signature over authenticatorData || clientDataHash
        self.verify_signature(&credential, &client_data_hash)?;

        // 12. Signature counter policy
        let signature_count =
            self.check_signature_counter(&credential, &auth_data, &mut warnings)?;

        // 13. Result
        Ok(AssertionResult {
            credential_id: credential.credential_id,
            signature_count,
            success: true,
            warnings,
        })
    }

    pub(crate) fn resolve_credential(
        &self,
        user_handle: impl FnOnce() -> Option<Vec<u8>>,
    ) -> Result<RegisteredCredential> {
        let handle = match &self.response.response.user_handle {
            Some(h) => h.clone(),
            None => user_handle().ok_or(VerificationError::UnknownCredential)?,
        };
        self.repository
            .lookup(&self.response.raw_id, &handle)
            .ok_or(VerificationError::UnknownCredential)
    }

    pub(crate) fn verify_response_fields(&self) -> Result<()> {
        let response = &self.response.response;
        for (name, field) in [
            ("clientDataJSON", &response.client_data_json),
            ("authenticatorData", &response.authenticator_data),
            ("signature", &response.signature),
        ] {
            if field.is_empty() {
                return Err(VerificationError::MalformedInput(format!("empty {name}")));
            }
        }
        Ok(())
    }

    pub(crate) fn parse_client_data(&self) -> Result<CollectedClientData> {
        CollectedClientData::from_json(&self.response.response.client_data_json)
    }

    pub(crate) fn verify_challenge(&self, client_data: &CollectedClientData) -> Result<()> {
        if self.request.challenge.len() < 16 {
            return Err(VerificationError::MalformedInput(
                "issued challenge is shorter than 16 bytes".into(),
            ));
        }
        client_data.verify_challenge(&self.request.challenge)
    }

    pub(crate) fn parse_authenticator_data(&self) -> Result<AuthenticatorData> {
        Ok(AuthenticatorData::parse(&self.response.response.authenticator_data)?)
    }

    pub(crate) fn verify_rp_id_hash(&self, auth_data: &AuthenticatorData) -> Result<()> {
        let expected = self.crypto.sha256(self.request.rp_id.as_bytes());
        if auth_data.rp_id_hash == expected {
            Ok(())
        } else {
            Err(VerificationError::RpIdHashMismatch)
        }
    }

    pub(crate) fn client_data_hash(&self, client_data: &CollectedClientData) -> Result<[u8; 32]> {
        client_data.verify_hash_algorithm()?;
        Ok(self.crypto.sha256(&self.response.response.client_data_json))
    }

    pub(crate) fn verify_signature(
        &self,
        credential: &RegisteredCredential,
        client_data_hash: &[u8; 32],
    ) -> Result<()> {
        let public_key = CosePublicKey::decode(&credential.public_key_cose)?;

        let auth_data = &self.response.response.authenticator_data;
        let mut signed = Vec::with_capacity(auth_data.len() + client_data_hash.len());
        signed.extend_from_slice(auth_data);
        signed.extend_from_slice(client_data_hash);

        if self
            .crypto
            .verify_cose(&public_key, &signed, &self.response.response.signature)
        {
            Ok(())
        } else {
            Err(VerificationError::SignatureInvalid)
        }
    }

    /// Counter semantics: a strictly increasing counter (or one the
    /// authenticator does not maintain, reported as zero) passes. A
    /// non-zero regression means a possible cloned authenticator; policy
    /// decides between rejecting and warning.
    pub(crate) fn check_signature_counter(
        &self,
        credential: &RegisteredCredential,
        auth_data: &AuthenticatorData,
        warnings: &mut Vec<String>,
    ) -> Result<u32> {
        let stored = credential.signature_count;
        let received = auth_data.sign_count;

        if received > stored || stored == 0 || received == 0 {
            return Ok(received);
        }

        if self.config.validate_signature_counter {
            return Err(VerificationError::CloneWarning { stored, received });
        }
        tracing::warn!(stored, received, "signature counter regressed");
        warnings.push(format!(
            "possible cloned authenticator: signature counter regressed from {stored} to {received}"
        ));
        Ok(received)
    }
}
