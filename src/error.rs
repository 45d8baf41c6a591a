use crate::codec::CodecError;

/// Why a ceremony was rejected. Kinds are for server-side diagnostics;
/// callers should answer the browser with a generic failure message rather
/// than echoing these.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("challenge mismatch")]
    ChallengeMismatch,
    #[error("origin {0:?} is not an allowed origin")]
    OriginMismatch(String),
    #[error("token binding id mismatch")]
    TokenBindingMismatch,
    #[error("client data type mismatch: {0:?}")]
    TypeMismatch(Option<String>),
    #[error("unsupported hash algorithm {0:?}")]
    UnsupportedHashAlgorithm(String),
    #[error("rpIdHash does not match the relying party id")]
    RpIdHashMismatch,
    #[error("user presence flag not set")]
    UserPresenceMissing,
    #[error("user verification required but not performed")]
    UserVerificationRequired,
    #[error("unknown credential")]
    UnknownCredential,
    #[error("credential id is already registered")]
    DuplicateCredentialId,
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("attestation format {0:?} unsupported")]
    AttestationFormatUnsupported(String),
    #[error("attestation statement invalid: {0}")]
    AttestationStatementInvalid(String),
    #[error("attestation not trusted")]
    AttestationUntrusted,
    #[error("signature counter regressed: stored {stored}, received {received}")]
    CloneWarning { stored: u32, received: u32 },
    #[error("extension {0:?} was not requested")]
    ExtensionNotRequested(String),
}

impl From<CodecError> for VerificationError {
    fn from(e: CodecError) -> Self {
        Self::MalformedInput(e.to_string())
    }
}

pub type Result<T, E = VerificationError> = std::result::Result<T, E>;
