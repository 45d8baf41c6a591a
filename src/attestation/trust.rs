use crate::crypto::Crypto;

/// Source of attestation trust roots, typically backed by an authenticator
/// metadata directory. Implementations must be safe for concurrent reads.
pub trait MetadataService: Send + Sync {
    /// DER-encoded root certificates acceptable for this authenticator
    /// model. Empty means the model is unknown to the service.
    fn trust_roots(&self, aaguid: [u8; 16]) -> Vec<Vec<u8>>;

    /// Opaque metadata describing the authenticator model, attached to the
    /// registration result when trust is established.
    fn metadata_for(&self, _aaguid: [u8; 16]) -> Option<serde_json::Value> {
        None
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TrustAssessment {
    pub trusted: bool,
    pub metadata: Option<serde_json::Value>,
}

/// Map AAGUID → roots and decide whether the ceremony's trust path chains
/// to one of them. Absent service or empty trust path can never be trusted.
pub(crate) fn assess(
    service: Option<&dyn MetadataService>,
    crypto: &dyn Crypto,
    aaguid: [u8; 16],
    trust_path: &[Vec<u8>],
) -> TrustAssessment {
    let Some(service) = service else {
        return TrustAssessment { trusted: false, metadata: None };
    };
    if trust_path.is_empty() {
        return TrustAssessment { trusted: false, metadata: None };
    }
    let roots = service.trust_roots(aaguid);
    let trusted = crypto.check_cert_path(trust_path, &roots);
    let metadata = if trusted { service.metadata_for(aaguid) } else { None };
    TrustAssessment { trusted, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;

    struct StaticRoots(Vec<Vec<u8>>);

    impl MetadataService for StaticRoots {
        fn trust_roots(&self, _aaguid: [u8; 16]) -> Vec<Vec<u8>> {
            self.0.clone()
        }

        fn metadata_for(&self, _aaguid: [u8; 16]) -> Option<serde_json::Value> {
            Some(serde_json::json!({"vendor": "Example"}))
        }
    }

    #[test]
    fn test_no_service_is_untrusted() {
        let result = assess(None, &DefaultCrypto, [0u8; 16], &[vec![1, 2, 3]]);
        assert!(!result.trusted);
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_empty_trust_path_is_untrusted() {
        let service = StaticRoots(vec![vec![1, 2, 3]]);
        let result = assess(Some(&service), &DefaultCrypto, [0u8; 16], &[]);
        assert!(!result.trusted);
    }

    #[test]
    fn test_unknown_model_is_untrusted() {
        let service = StaticRoots(Vec::new());
        let result = assess(Some(&service), &DefaultCrypto, [0u8; 16], &[vec![0x30, 0x00]]);
        assert!(!result.trusted);
        assert!(result.metadata.is_none());
    }
}
