use crate::assertion::AssertionCeremony;
use crate::attestation::MetadataService;
use crate::crypto::{ChallengeGenerator, Crypto, DefaultCrypto, RandomChallengeGenerator};
use crate::data::{
    AssertionResponse, AssertionResult, AttestationConveyancePreference, AttestationResponse,
    AuthenticatorSelectionCriteria, CreationOptions, Extensions, PublicKeyCredential,
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, RegistrationResult,
    RequestOptions, RpIdentity, UserIdentity,
};
use crate::error::Result;
use crate::registration::RegistrationCeremony;
use crate::repository::CredentialRepository;

/// Immutable relying-party policy. Defaults mirror a permissive 2018-era
/// deployment: token binding optional, untrusted attestation accepted,
/// signature counters enforced, client-data type not validated.
#[derive(Debug, Clone)]
pub struct RpConfig {
    pub rp: RpIdentity,
    /// Exact origin strings accepted in client data. Empty rejects all.
    pub origins: Vec<String>,
    pub algorithms: Vec<PublicKeyCredentialParameters>,
    pub attestation: AttestationConveyancePreference,
    pub allow_missing_token_binding: bool,
    pub allow_untrusted_attestation: bool,
    pub validate_signature_counter: bool,
    pub validate_type_attribute: bool,
}

impl RpConfig {
    pub fn new(rp: RpIdentity, origins: Vec<String>) -> Self {
        Self {
            rp,
            origins,
            algorithms: vec![PublicKeyCredentialParameters::es256()],
            attestation: AttestationConveyancePreference::Direct,
            allow_missing_token_binding: true,
            allow_untrusted_attestation: true,
            validate_signature_counter: true,
            validate_type_attribute: false,
        }
    }
}

/// The ceremony driver. Holds configuration and the injected collaborators;
/// every `finish_*` call is a pure function of its arguments and the
/// repository's current contents, so concurrent ceremonies need no
/// coordination inside this type.
pub struct RelyingParty {
    config: RpConfig,
    challenge_generator: Box<dyn ChallengeGenerator>,
    crypto: Box<dyn Crypto>,
    repository: Box<dyn CredentialRepository>,
    metadata_service: Option<Box<dyn MetadataService>>,
}

impl RelyingParty {
    pub fn new(config: RpConfig, repository: Box<dyn CredentialRepository>) -> Self {
        Self {
            config,
            challenge_generator: Box::new(RandomChallengeGenerator::new()),
            crypto: Box::new(DefaultCrypto),
            repository,
            metadata_service: None,
        }
    }

    pub fn with_challenge_generator(mut self, generator: Box<dyn ChallengeGenerator>) -> Self {
        self.challenge_generator = generator;
        self
    }

    pub fn with_crypto(mut self, crypto: Box<dyn Crypto>) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_metadata_service(mut self, service: Box<dyn MetadataService>) -> Self {
        self.metadata_service = Some(service);
        self
    }

    pub fn config(&self) -> &RpConfig {
        &self.config
    }

    pub fn repository(&self) -> &dyn CredentialRepository {
        self.repository.as_ref()
    }

    /// Build creation options for a new registration ceremony. The caller
    /// stores the returned options (they hold the challenge) until the
    /// browser responds or the request expires.
    pub fn start_registration(
        &self,
        user: UserIdentity,
        exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
        authenticator_selection: Option<AuthenticatorSelectionCriteria>,
        extensions: Option<Extensions>,
    ) -> CreationOptions {
        CreationOptions {
            rp: self.config.rp.clone(),
            user,
            challenge: self.challenge_generator.generate(),
            pub_key_cred_params: self.config.algorithms.clone(),
            exclude_credentials,
            authenticator_selection,
            attestation: self.config.attestation,
            extensions,
        }
    }

    /// Run the registration pipeline. The first failing step's error is
    /// returned verbatim.
    pub fn finish_registration(
        &self,
        request: &CreationOptions,
        response: &PublicKeyCredential<AttestationResponse>,
        caller_token_binding_id: Option<&str>,
    ) -> Result<RegistrationResult> {
        let ceremony = RegistrationCeremony {
            config: &self.config,
            crypto: self.crypto.as_ref(),
            repository: self.repository.as_ref(),
            metadata_service: self.metadata_service.as_deref(),
            request,
            response,
            caller_token_binding_id,
        };
        let result = ceremony.run();
        if let Err(e) = &result {
            tracing::warn!("registration ceremony rejected: {e}");
        }
        result
    }

    /// Build request options for a new assertion ceremony.
    pub fn start_assertion(
        &self,
        allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
        extensions: Option<Extensions>,
    ) -> RequestOptions {
        RequestOptions {
            rp_id: self.config.rp.id.clone(),
            challenge: self.challenge_generator.generate(),
            allow_credentials,
            extensions,
        }
    }

    /// Run the assertion pipeline. `user_handle` supplies the stored user
    /// handle on the username path; it is consulted only when the
    /// authenticator response carries none.
    pub fn finish_assertion(
        &self,
        request: &RequestOptions,
        response: &PublicKeyCredential<AssertionResponse>,
        user_handle: impl FnOnce() -> Option<Vec<u8>>,
        caller_token_binding_id: Option<&str>,
    ) -> Result<AssertionResult> {
        let ceremony = AssertionCeremony {
            config: &self.config,
            crypto: self.crypto.as_ref(),
            repository: self.repository.as_ref(),
            request,
            response,
            caller_token_binding_id,
        };
        let result = ceremony.run(user_handle);
        if let Err(e) = &result {
            tracing::warn!("assertion ceremony rejected: {e}");
        }
        result
    }
}
