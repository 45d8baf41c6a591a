use serde::{Deserialize, Serialize};

use crate::codec::{base64url, CodecError};
use crate::crypto::constant_time_eq;
use crate::data::options::Extensions;
use crate::error::VerificationError;

/// The browser-returned credential object. `T` is either an
/// [`AttestationResponse`] (registration) or an [`AssertionResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyCredential<T> {
    pub id: String,
    #[serde(rename = "rawId", with = "base64url::bytes")]
    pub raw_id: Vec<u8>,
    pub response: T,
    #[serde(
        rename = "clientExtensionResults",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub client_extension_results: Option<serde_json::Value>,
}

/// `AuthenticatorAttestationResponse`: what `credentials.create()` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationResponse {
    #[serde(rename = "clientDataJSON", with = "base64url::bytes")]
    pub client_data_json: Vec<u8>,
    #[serde(rename = "attestationObject", with = "base64url::bytes")]
    pub attestation_object: Vec<u8>,
}

/// `AuthenticatorAssertionResponse`: what `credentials.get()` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionResponse {
    #[serde(rename = "clientDataJSON", with = "base64url::bytes")]
    pub client_data_json: Vec<u8>,
    #[serde(rename = "authenticatorData", with = "base64url::bytes")]
    pub authenticator_data: Vec<u8>,
    #[serde(with = "base64url::bytes")]
    pub signature: Vec<u8>,
    #[serde(
        rename = "userHandle",
        with = "base64url::opt_bytes",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub user_handle: Option<Vec<u8>>,
}

/// Client data as parsed from `clientDataJSON` (2018-03-20 CR layout).
///
/// The `type` member is optional on the wire: browsers of the era did not
/// all send it, which is why type validation is policy-gated.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectedClientData {
    #[serde(rename = "type", default)]
    pub client_data_type: Option<String>,
    pub challenge: String,
    pub origin: String,
    #[serde(rename = "hashAlgorithm")]
    pub hash_algorithm: String,
    #[serde(rename = "tokenBindingId", default)]
    pub token_binding_id: Option<String>,
    #[serde(rename = "clientExtensions", default)]
    pub client_extensions: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "authenticatorExtensions", default)]
    pub authenticator_extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CollectedClientData {
    /// Decode `clientDataJSON` bytes (UTF-8 JSON).
    pub fn from_json(raw: &[u8]) -> Result<Self, VerificationError> {
        serde_json::from_slice(raw)
            .map_err(|e| CodecError::Json(format!("clientDataJSON: {e}")).into())
    }

    /// When type validation is on, the `type` member must equal `expected`.
    pub(crate) fn verify_type(
        &self,
        validate: bool,
        expected: &str,
    ) -> Result<(), VerificationError> {
        if !validate {
            return Ok(());
        }
        match self.client_data_type.as_deref() {
            Some(t) if t == expected => Ok(()),
            _ => Err(VerificationError::TypeMismatch(self.client_data_type.clone())),
        }
    }

    /// Constant-time comparison of the decoded `challenge` member against
    /// the challenge the relying party issued.
    pub(crate) fn verify_challenge(&self, expected: &[u8]) -> Result<(), VerificationError> {
        let returned = base64url::decode(&self.challenge)
            .map_err(|e| VerificationError::MalformedInput(format!("challenge: {e}")))?;
        if constant_time_eq(&returned, expected) {
            Ok(())
        } else {
            Err(VerificationError::ChallengeMismatch)
        }
    }

    /// `origin` must be an exact member of the configured allow-list.
    pub(crate) fn verify_origin(&self, origins: &[String]) -> Result<(), VerificationError> {
        if origins.iter().any(|o| o == &self.origin) {
            Ok(())
        } else {
            Err(VerificationError::OriginMismatch(self.origin.clone()))
        }
    }

    /// Token binding policy: a side that asserts a binding id must be
    /// matched exactly by the other; absence on both sides passes only when
    /// the relying party tolerates unbound channels.
    pub(crate) fn verify_token_binding(
        &self,
        caller: Option<&str>,
        allow_missing: bool,
    ) -> Result<(), VerificationError> {
        match (caller, self.token_binding_id.as_deref()) {
            (Some(a), Some(b)) => {
                if constant_time_eq(a.as_bytes(), b.as_bytes()) {
                    Ok(())
                } else {
                    Err(VerificationError::TokenBindingMismatch)
                }
            }
            (None, None) => {
                if allow_missing {
                    Ok(())
                } else {
                    Err(VerificationError::TokenBindingMismatch)
                }
            }
            _ => Err(VerificationError::TokenBindingMismatch),
        }
    }

    /// Only SHA-256 client data hashing is acceptable.
    pub(crate) fn verify_hash_algorithm(&self) -> Result<(), VerificationError> {
        if self.hash_algorithm == "SHA-256" {
            Ok(())
        } else {
            Err(VerificationError::UnsupportedHashAlgorithm(
                self.hash_algorithm.clone(),
            ))
        }
    }

    /// Every extension the client echoes back must have been requested.
    pub(crate) fn verify_extension_subset(
        &self,
        requested: Option<&Extensions>,
    ) -> Result<(), VerificationError> {
        for echoed in [&self.client_extensions, &self.authenticator_extensions]
            .into_iter()
            .flatten()
        {
            for key in echoed.keys() {
                if !requested.is_some_and(|r| r.contains_key(key)) {
                    return Err(VerificationError::ExtensionNotRequested(key.clone()));
                }
            }
        }
        Ok(())
    }
}
