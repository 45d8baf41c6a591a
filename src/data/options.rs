use serde::{Deserialize, Serialize};

use super::identity::{RpIdentity, UserIdentity};
use crate::codec::{base64url, CoseAlgorithm};

/// Requested extension inputs, keyed by extension identifier. The core
/// treats the values as opaque; only the key set matters to verification.
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// Reference to a registered credential, as exchanged with the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(with = "base64url::bytes")]
    pub id: Vec<u8>,
}

impl PublicKeyCredentialDescriptor {
    pub fn public_key(id: Vec<u8>) -> Self {
        Self { credential_type: "public-key".into(), id }
    }
}

/// One acceptable credential algorithm for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyCredentialParameters {
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub alg: CoseAlgorithm,
}

impl PublicKeyCredentialParameters {
    pub fn es256() -> Self {
        Self { credential_type: CredentialType::PublicKey, alg: CoseAlgorithm::Es256 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialType {
    #[serde(rename = "public-key")]
    PublicKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationConveyancePreference {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "indirect")]
    Indirect,
    #[serde(rename = "direct")]
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserVerificationRequirement {
    #[serde(rename = "discouraged")]
    Discouraged,
    #[default]
    #[serde(rename = "preferred")]
    Preferred,
    #[serde(rename = "required")]
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthenticatorSelectionCriteria {
    #[serde(
        rename = "authenticatorAttachment",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub authenticator_attachment: Option<String>,
    #[serde(rename = "requireResidentKey", default)]
    pub require_resident_key: bool,
    #[serde(rename = "userVerification", default)]
    pub user_verification: UserVerificationRequirement,
}

/// `PublicKeyCredentialCreationOptions`: everything the browser needs to run
/// `navigator.credentials.create()`, produced by `start_registration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationOptions {
    pub rp: RpIdentity,
    pub user: UserIdentity,
    #[serde(with = "base64url::bytes")]
    pub challenge: Vec<u8>,
    #[serde(rename = "pubKeyCredParams")]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    #[serde(
        rename = "excludeCredentials",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
    #[serde(
        rename = "authenticatorSelection",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,
    pub attestation: AttestationConveyancePreference,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extensions: Option<Extensions>,
}

/// `PublicKeyCredentialRequestOptions`: input to
/// `navigator.credentials.get()`, produced by `start_assertion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(rename = "rpId")]
    pub rp_id: String,
    #[serde(with = "base64url::bytes")]
    pub challenge: Vec<u8>,
    #[serde(
        rename = "allowCredentials",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extensions: Option<Extensions>,
}
