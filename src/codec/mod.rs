pub mod authenticator_data;
pub mod base64url;
pub mod cbor;
pub mod cose;

pub use authenticator_data::{AttestedCredentialData, AuthenticatorData};
pub use cose::{CoseAlgorithm, CosePublicKey};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("base64url: {0}")]
    Base64(String),
    #[error("JSON: {0}")]
    Json(String),
    #[error("CBOR: {0}")]
    Cbor(String),
    #[error("COSE key: {0}")]
    CoseKey(String),
    #[error("authenticator data: {0}")]
    AuthenticatorData(String),
}
