use crate::data::PublicKeyCredentialDescriptor;

/// A credential as the caller's storage remembers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCredential {
    pub credential_id: Vec<u8>,
    pub user_handle: Vec<u8>,
    /// Raw COSE_Key bytes captured at registration.
    pub public_key_cose: Vec<u8>,
    pub signature_count: u32,
}

/// Read-side of the caller's credential storage. The pipelines only ever
/// read; adding registrations and persisting counter updates happen in the
/// caller after a ceremony succeeds. Implementations must be safe for
/// concurrent lookups.
pub trait CredentialRepository: Send + Sync {
    /// Descriptors for every credential registered to `username`, for
    /// building exclude/allow lists.
    fn credential_ids_for_username(&self, username: &str) -> Vec<PublicKeyCredentialDescriptor>;

    fn user_handle_for_username(&self, username: &str) -> Option<Vec<u8>>;

    fn username_for_user_handle(&self, user_handle: &[u8]) -> Option<String>;

    /// The credential with this id belonging to this user handle; both must
    /// match.
    fn lookup(&self, credential_id: &[u8], user_handle: &[u8]) -> Option<RegisteredCredential>;

    /// Every registration of this credential id regardless of user, for the
    /// global uniqueness check at registration.
    fn lookup_all(&self, credential_id: &[u8]) -> Vec<RegisteredCredential>;
}
