use crate::attestation::{self, MetadataService, VerifiedAttestation};
use crate::codec::{AttestedCredentialData, AuthenticatorData};
use crate::crypto::Crypto;
use crate::data::{
    AttestationObject, AttestationResponse, AttestationType, CollectedClientData, CreationOptions,
    PublicKeyCredential, PublicKeyCredentialDescriptor, RegistrationResult,
    UserVerificationRequirement,
};
use crate::error::{Result, VerificationError};
use crate::repository::CredentialRepository;
use crate::rp::RpConfig;

/// One registration ceremony: the creation options the relying party
/// issued, the credential the browser returned, and the policy to verify
/// them under. Steps follow the order mandated for attestation
/// verification; the first failing step aborts the chain.
pub(crate) struct RegistrationCeremony<'a> {
    pub config: &'a RpConfig,
    pub crypto: &'a dyn Crypto,
    pub repository: &'a dyn CredentialRepository,
    pub metadata_service: Option<&'a dyn MetadataService>,
    pub request: &'a CreationOptions,
    pub response: &'a PublicKeyCredential<AttestationResponse>,
    pub caller_token_binding_id: Option<&'a str>,
}

impl RegistrationCeremony<'_> {
    pub fn run(&self) -> Result<RegistrationResult> {
        let mut warnings = Vec::new();

        // 1. Parse clientDataJSON
        let client_data = self.parse_client_data()?;

        // 2. Type attribute
        client_data.verify_type(self.config.validate_type_attribute, "webauthn.create")?;

        // 3. Challenge
        self.verify_challenge(&client_data)?;

        // 4. Origin
        client_data.verify_origin(&self.config.origins)?;

        // 5. Token binding (absence on both sides always passes here)
        client_data.verify_token_binding(self.caller_token_binding_id, true)?;

        // 6. clientDataHash
        let client_data_hash = self.client_data_hash(&client_data)?;

        // 7. attestationObject
        let object = self.decode_attestation_object()?;
        let credential = attested_credential(&object.auth_data)?;

        // 8. rpIdHash
        self.verify_rp_id_hash(&object.auth_data)?;

        // 9. User presence / verification
        self.verify_user_present(&object.auth_data)?;

        // 10. Attestation statement
        let attestation = self.verify_attestation_statement(&object, &client_data_hash)?;
        tracing::debug!(
            fmt = %object.fmt,
            attestation_type = ?attestation.attestation_type,
            "attestation statement verified"
        );

        // 11. Trust
        let (attestation_trusted, attestation_metadata) =
            self.verify_trust(&object, &attestation, credential, &mut warnings)?;

        // 12. Credential id must be new
        self.verify_credential_id_unregistered(&credential.credential_id)?;

        // 13. Result
        Ok(RegistrationResult {
            key_id: PublicKeyCredentialDescriptor::public_key(credential.credential_id.clone()),
            attestation_trusted,
            attestation_type: attestation.attestation_type,
            attestation_metadata,
            public_key_cose: credential.public_key_cose.clone(),
            signature_count: object.auth_data.sign_count,
            warnings,
        })
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

    pub(crate) fn client_data_hash(&self, client_data: &CollectedClientData) -> Result<[u8; 32]> {
        client_data.verify_hash_algorithm()?;
        Ok(self.crypto.sha256(&self.response.response.client_data_json))
    }

    pub(crate) fn decode_attestation_object(&self) -> Result<AttestationObject> {
        Ok(AttestationObject::decode(&self.response.response.attestation_object)?)
    }

    pub(crate) fn verify_rp_id_hash(&self, auth_data: &AuthenticatorData) -> Result<()> {
        let expected = self.crypto.sha256(self.config.rp.id.as_bytes());
        if auth_data.rp_id_hash == expected {
            Ok(())
        } else {
            Err(VerificationError::RpIdHashMismatch)
        }
    }

    pub(crate) fn verify_user_present(&self, auth_data: &AuthenticatorData) -> Result<()> {
        if !auth_data.user_present() {
            return Err(VerificationError::UserPresenceMissing);
        }
        let verification_required = self
            .request
            .authenticator_selection
            .as_ref()
            .is_some_and(|s| s.user_verification == UserVerificationRequirement::Required);
        if verification_required && !auth_data.user_verified() {
            return Err(VerificationError::UserVerificationRequired);
        }
        Ok(())
    }

    pub(crate) fn verify_attestation_statement(
        &self,
        object: &AttestationObject,
        client_data_hash: &[u8; 32],
    ) -> Result<VerifiedAttestation> {
        attestation::verify_statement(
            &object.fmt,
            &object.att_stmt,
            &object.auth_data,
            &object.auth_data_bytes,
            client_data_hash,
            self.crypto,
        )
    }

    pub(crate) fn verify_trust(
        &self,
        object: &AttestationObject,
        attestation: &VerifiedAttestation,
        credential: &AttestedCredentialData,
        warnings: &mut Vec<String>,
    ) -> Result<(bool, Option<serde_json::Value>)> {
        let assessment = attestation::trust::assess(
            self.metadata_service,
            self.crypto,
            credential.aaguid,
            &attestation.trust_path,
        );
        let attestation_trusted = assessment.trusted
            || (attestation.attestation_type == AttestationType::SelfAttestation
                && self.config.allow_untrusted_attestation);

        if !attestation_trusted && !self.config.allow_untrusted_attestation {
            return Err(VerificationError::AttestationUntrusted);
        }
        if attestation.attestation_type == AttestationType::Unknown {
            warnings.push(format!(
                "attestation format {:?} is not supported; accepting untrusted",
                object.fmt
            ));
        }
        Ok((attestation_trusted, assessment.metadata))
    }

    pub(crate) fn verify_credential_id_unregistered(&self, credential_id: &[u8]) -> Result<()> {
        if self.repository.lookup_all(credential_id).is_empty() {
            Ok(())
        } else {
            Err(VerificationError::DuplicateCredentialId)
        }
    }
}

fn attested_credential(auth_data: &AuthenticatorData) -> Result<&AttestedCredentialData> {
    auth_data.attested_credential_data.as_ref().ok_or_else(|| {
        VerificationError::MalformedInput("attestation without attested credential data".into())
    })
}
