pub mod attestation_object;
pub mod identity;
pub mod options;
pub mod response;
pub mod result;

pub use attestation_object::AttestationObject;
pub use identity::{RpIdentity, UserIdentity};
pub use options::{
    AttestationConveyancePreference, AuthenticatorSelectionCriteria, CreationOptions,
    CredentialType, Extensions, PublicKeyCredentialDescriptor, PublicKeyCredentialParameters,
    RequestOptions, UserVerificationRequirement,
};
pub use response::{
    AssertionResponse, AttestationResponse, CollectedClientData, PublicKeyCredential,
};
pub use result::{AssertionResult, AttestationType, RegistrationResult};
