use super::options::PublicKeyCredentialDescriptor;

/// How the attestation statement vouches for the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationType {
    Basic,
    SelfAttestation,
    AttCa,
    Ecdaa,
    None,
    Unknown,
}

/// Outcome of a successful registration ceremony. The caller persists the
/// credential (key id, COSE public key, initial signature count) through its
/// own storage; the core never writes.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    pub key_id: PublicKeyCredentialDescriptor,
    pub attestation_trusted: bool,
    pub attestation_type: AttestationType,
    pub attestation_metadata: Option<serde_json::Value>,
    pub public_key_cose: Vec<u8>,
    pub signature_count: u32,
    pub warnings: Vec<String>,
}

/// Outcome of a successful assertion ceremony. `signature_count` is the
/// value the caller should store for this credential.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    pub credential_id: Vec<u8>,
    pub signature_count: u32,
    pub success: bool,
    pub warnings: Vec<String>,
}
