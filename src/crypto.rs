use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use x509_parser::prelude::*;

use crate::codec::CosePublicKey;

/// Source of registration/assertion challenges. Implementations must be
/// safe for concurrent draws and must produce at least 16 cryptographically
/// random octets per call.
pub trait ChallengeGenerator: Send + Sync {
    fn generate(&self) -> Vec<u8>;
}

/// Draws 32 random bytes per challenge from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomChallengeGenerator {
    length: usize,
}

impl RandomChallengeGenerator {
    pub fn new() -> Self {
        Self { length: 32 }
    }
}

impl Default for RandomChallengeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeGenerator for RandomChallengeGenerator {
    fn generate(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.length];
        rand::thread_rng().fill_bytes(&mut buf);
        buf
    }
}

/// Cryptographic primitives the pipelines depend on. All methods are pure
/// functions of their inputs; implementations must be `Send + Sync` so
/// ceremonies can run from any thread.
pub trait Crypto: Send + Sync {
    /// SHA-256.
    fn sha256(&self, data: &[u8]) -> [u8; 32];

    /// Verify a DER-encoded ECDSA signature with a decoded COSE credential
    /// key over `message`.
    fn verify_cose(&self, key: &CosePublicKey, message: &[u8], signature_der: &[u8]) -> bool;

    /// Verify a DER-encoded ECDSA signature with an SEC1 P-256 point (the
    /// form X.509 certificates carry in their SubjectPublicKeyInfo).
    fn verify_sec1_p256(&self, point: &[u8], message: &[u8], signature_der: &[u8]) -> bool;

    /// Whether `chain` (leaf first, DER) verifies link-by-link and
    /// terminates at one of `roots` (DER).
    fn check_cert_path(&self, chain: &[Vec<u8>], roots: &[Vec<u8>]) -> bool;
}

/// Default [`Crypto`] backed by the p256 / sha2 / x509-parser stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCrypto;

impl Crypto for DefaultCrypto {
    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn verify_cose(&self, key: &CosePublicKey, message: &[u8], signature_der: &[u8]) -> bool {
        match key {
            CosePublicKey::Es256 { x, y } => {
                let point = p256::EncodedPoint::from_affine_coordinates(
                    p256::FieldBytes::from_slice(x),
                    p256::FieldBytes::from_slice(y),
                    false,
                );
                let verifying_key = match VerifyingKey::from_encoded_point(&point) {
                    Ok(k) => k,
                    Err(_) => return false,
                };
                verify_der(&verifying_key, message, signature_der)
            }
        }
    }

    fn verify_sec1_p256(&self, point: &[u8], message: &[u8], signature_der: &[u8]) -> bool {
        let verifying_key = match VerifyingKey::from_sec1_bytes(point) {
            Ok(k) => k,
            Err(_) => return false,
        };
        verify_der(&verifying_key, message, signature_der)
    }

    fn check_cert_path(&self, chain: &[Vec<u8>], roots: &[Vec<u8>]) -> bool {
        if chain.is_empty() || roots.is_empty() {
            return false;
        }
        let parsed: Vec<X509Certificate> = match chain
            .iter()
            .map(|der| parse_x509_certificate(der).map(|(_, cert)| cert))
            .collect()
        {
            Ok(certs) => certs,
            Err(_) => return false,
        };

        for pair in parsed.windows(2) {
            if pair[0]
                .verify_signature(Some(&pair[1].tbs_certificate.subject_pki))
                .is_err()
            {
                return false;
            }
        }

        let last = parsed.last().expect("chain is non-empty");
        let last_der = chain.last().expect("chain is non-empty");
        roots.iter().any(|root_der| {
            if root_der == last_der {
                return true;
            }
            match parse_x509_certificate(root_der) {
                Ok((_, root)) => last
                    .verify_signature(Some(&root.tbs_certificate.subject_pki))
                    .is_ok(),
                Err(_) => false,
            }
        })
    }
}

fn verify_der(key: &VerifyingKey, message: &[u8], signature_der: &[u8]) -> bool {
    let signature = match Signature::from_der(signature_der) {
        Ok(s) => s,
        Err(_) => return false,
    };
    key.verify(message, &signature).is_ok()
}

/// Constant-time byte equality for secret-derived values (challenges, token
/// binding ids). Length mismatch returns early; lengths are not secret.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
