//! Server-side verification core for WebAuthn ceremonies (W3C Candidate
//! Recommendation of 2018-03-20).
//!
//! The [`RelyingParty`] façade issues creation/request options and runs the
//! two verification pipelines: registration (attestation) and
//! authentication (assertion). Storage, challenge bookkeeping, and
//! transport belong to the caller, injected through the
//! [`CredentialRepository`], [`ChallengeGenerator`], [`MetadataService`],
//! and [`Crypto`] traits.

pub mod attestation;
pub mod codec;
pub mod crypto;
pub mod data;
pub mod error;
pub mod repository;
pub mod rp;

pub(crate) mod assertion;
pub(crate) mod registration;

pub use attestation::MetadataService;
pub use crypto::{ChallengeGenerator, Crypto, DefaultCrypto, RandomChallengeGenerator};
pub use data::{
    AssertionResponse, AssertionResult, AttestationConveyancePreference, AttestationResponse,
    AttestationType, AuthenticatorSelectionCriteria, CollectedClientData, CreationOptions,
    CredentialType, Extensions, PublicKeyCredential, PublicKeyCredentialDescriptor,
    PublicKeyCredentialParameters, RegistrationResult, RequestOptions, RpIdentity, UserIdentity,
    UserVerificationRequirement,
};
pub use error::VerificationError;
pub use repository::{CredentialRepository, RegisteredCredential};
pub use rp::{RelyingParty, RpConfig};
