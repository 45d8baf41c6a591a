#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use ciborium::value::Value;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256};

use webauthn_rp::codec::base64url;
use webauthn_rp::{
    AttestationResponse, AssertionResponse, ChallengeGenerator, CreationOptions,
    CredentialRepository, MetadataService, PublicKeyCredential, PublicKeyCredentialDescriptor,
    RegisteredCredential, RequestOptions, RpConfig, RpIdentity, UserIdentity,
};

/// Challenge used by the assertion fixtures, as issued by the relying party.
pub const CHALLENGE_B64: &str = "AAEBAgMFCA0VIjdZEGl5Yls";

pub fn challenge_bytes() -> Vec<u8> {
    base64url::decode(CHALLENGE_B64).unwrap()
}

pub fn rp_config() -> RpConfig {
    RpConfig::new(
        RpIdentity::new("localhost", "Example RP"),
        vec!["localhost".to_string()],
    )
}

pub fn user() -> UserIdentity {
    UserIdentity {
        id: b"user-handle-0001".to_vec(),
        name: "alice".into(),
        display_name: "Alice".into(),
        icon: None,
    }
}

/// Deterministic P-256 key so fixtures are reproducible across runs.
pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[0x5au8; 32].into()).unwrap()
}

pub fn cose_key_bytes(key: &SigningKey) -> Vec<u8> {
    let point = key.verifying_key().to_encoded_point(false);
    let map = Value::Map(vec![
        (Value::Integer(1i64.into()), Value::Integer(2i64.into())),
        (Value::Integer(3i64.into()), Value::Integer((-7i64).into())),
        (Value::Integer((-1i64).into()), Value::Integer(1i64.into())),
        (
            Value::Integer((-2i64).into()),
            Value::Bytes(point.x().unwrap().to_vec()),
        ),
        (
            Value::Integer((-3i64).into()),
            Value::Bytes(point.y().unwrap().to_vec()),
        ),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).unwrap();
    buf
}

/// Authenticator data for an assertion: header only, no attested data.
pub fn assertion_auth_data(rp_id: &str, flags: u8, sign_count: u32) -> Vec<u8> {
    let rp_id_hash: [u8; 32] = Sha256::digest(rp_id.as_bytes()).into();
    let mut data = Vec::new();
    data.extend_from_slice(&rp_id_hash);
    data.push(flags);
    data.extend_from_slice(&sign_count.to_be_bytes());
    data
}

/// Authenticator data for a registration: AT flag plus attested credential
/// data carrying `key`'s public half.
pub fn registration_auth_data(
    rp_id: &str,
    flags: u8,
    sign_count: u32,
    credential_id: &[u8],
    key: &SigningKey,
) -> Vec<u8> {
    let mut data = assertion_auth_data(rp_id, flags, sign_count);
    data.extend_from_slice(&[0x01u8; 16]); // aaguid
    data.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
    data.extend_from_slice(credential_id);
    data.extend_from_slice(&cose_key_bytes(key));
    data
}

pub fn client_data_json(challenge_b64: &str, origin: &str) -> Vec<u8> {
    format!(
        r#"{{"challenge":"{challenge_b64}","origin":"{origin}","hashAlgorithm":"SHA-256"}}"#
    )
    .into_bytes()
}

/// DER ECDSA signature over `authenticatorData || SHA-256(clientDataJSON)`.
pub fn sign_assertion(key: &SigningKey, auth_data: &[u8], client_data_json: &[u8]) -> Vec<u8> {
    let client_data_hash: [u8; 32] = Sha256::digest(client_data_json).into();
    let mut signed = auth_data.to_vec();
    signed.extend_from_slice(&client_data_hash);
    let signature: Signature = key.sign(&signed);
    signature.to_der().as_bytes().to_vec()
}

pub fn attestation_object_bytes(fmt: &str, auth_data: &[u8], att_stmt: Value) -> Vec<u8> {
    let map = Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text(fmt.into())),
        (Value::Text("authData".into()), Value::Bytes(auth_data.to_vec())),
        (Value::Text("attStmt".into()), att_stmt),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).unwrap();
    buf
}

pub fn registration_credential(
    credential_id: &[u8],
    attestation_object: Vec<u8>,
    client_data_json: Vec<u8>,
) -> PublicKeyCredential<AttestationResponse> {
    PublicKeyCredential {
        id: base64url::encode(credential_id),
        raw_id: credential_id.to_vec(),
        response: AttestationResponse { client_data_json, attestation_object },
        client_extension_results: None,
    }
}

pub fn assertion_credential(
    credential_id: &[u8],
    auth_data: Vec<u8>,
    client_data_json: Vec<u8>,
    signature: Vec<u8>,
    user_handle: Option<Vec<u8>>,
) -> PublicKeyCredential<AssertionResponse> {
    PublicKeyCredential {
        id: base64url::encode(credential_id),
        raw_id: credential_id.to_vec(),
        response: AssertionResponse {
            client_data_json,
            authenticator_data: auth_data,
            signature,
            user_handle,
        },
        client_extension_results: None,
    }
}

pub fn creation_options(config: &RpConfig, challenge: Vec<u8>) -> CreationOptions {
    CreationOptions {
        rp: config.rp.clone(),
        user: user(),
        challenge,
        pub_key_cred_params: config.algorithms.clone(),
        exclude_credentials: None,
        authenticator_selection: None,
        attestation: config.attestation,
        extensions: None,
    }
}

pub fn request_options(config: &RpConfig, challenge: Vec<u8>) -> RequestOptions {
    RequestOptions {
        rp_id: config.rp.id.clone(),
        challenge,
        allow_credentials: None,
        extensions: None,
    }
}

/// A root CA and an attestation leaf certificate signed by it, with the
/// leaf's private key for minting attestation signatures.
pub struct AttestationCertChain {
    pub root_der: Vec<u8>,
    pub leaf_der: Vec<u8>,
    pub leaf_key: SigningKey,
}

/// Generate a fresh two-certificate P-256 chain. Keys are random, so two
/// calls produce unrelated chains.
pub fn attestation_cert_chain() -> AttestationCertChain {
    let mut ca_params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
    ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    let mut ca_name = rcgen::DistinguishedName::new();
    ca_name.push(rcgen::DnType::CommonName, "Test Attestation Root");
    ca_params.distinguished_name = ca_name;
    let ca_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();

    let leaf_params =
        rcgen::CertificateParams::new(vec!["attestation.test".to_string()]).unwrap();
    let leaf_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
    let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

    AttestationCertChain {
        root_der: ca_cert.der().to_vec(),
        leaf_der: leaf_cert.der().to_vec(),
        leaf_key: SigningKey::from_pkcs8_der(&leaf_key.serialize_der()).unwrap(),
    }
}

pub fn authenticator_metadata() -> serde_json::Value {
    serde_json::json!({"vendor": "Example Authenticators Inc."})
}

/// Metadata service answering every AAGUID with a fixed root set.
pub struct StaticMetadata {
    pub roots: Vec<Vec<u8>>,
}

impl MetadataService for StaticMetadata {
    fn trust_roots(&self, _aaguid: [u8; 16]) -> Vec<Vec<u8>> {
        self.roots.clone()
    }

    fn metadata_for(&self, _aaguid: [u8; 16]) -> Option<serde_json::Value> {
        Some(authenticator_metadata())
    }
}

/// Challenge generator that always returns the same bytes, for asserting
/// what `start_*` puts on the wire.
pub struct FixedChallenge(pub Vec<u8>);

impl ChallengeGenerator for FixedChallenge {
    fn generate(&self) -> Vec<u8> {
        self.0.clone()
    }
}

/// In-memory credential storage: primary index by credential id plus a
/// by-username secondary index of credential ids.
#[derive(Default)]
struct RepositoryIndex {
    by_id: HashMap<Vec<u8>, RegisteredCredential>,
    by_username: HashMap<String, Vec<Vec<u8>>>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    index: Mutex<RepositoryIndex>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, username: &str, credential: RegisteredCredential) {
        let mut index = self.index.lock().unwrap();
        index
            .by_username
            .entry(username.to_string())
            .or_default()
            .push(credential.credential_id.clone());
        index.by_id.insert(credential.credential_id.clone(), credential);
    }
}

impl CredentialRepository for InMemoryRepository {
    fn credential_ids_for_username(&self, username: &str) -> Vec<PublicKeyCredentialDescriptor> {
        let index = self.index.lock().unwrap();
        index
            .by_username
            .get(username)
            .into_iter()
            .flatten()
            .map(|id| PublicKeyCredentialDescriptor::public_key(id.clone()))
            .collect()
    }

    fn user_handle_for_username(&self, username: &str) -> Option<Vec<u8>> {
        let index = self.index.lock().unwrap();
        index
            .by_username
            .get(username)?
            .iter()
            .filter_map(|id| index.by_id.get(id))
            .map(|cred| cred.user_handle.clone())
            .next()
    }

    fn username_for_user_handle(&self, user_handle: &[u8]) -> Option<String> {
        let index = self.index.lock().unwrap();
        index.by_username.iter().find_map(|(name, ids)| {
            ids.iter()
                .filter_map(|id| index.by_id.get(id))
                .any(|cred| cred.user_handle == user_handle)
                .then(|| name.clone())
        })
    }

    fn lookup(&self, credential_id: &[u8], user_handle: &[u8]) -> Option<RegisteredCredential> {
        let index = self.index.lock().unwrap();
        index
            .by_id
            .get(credential_id)
            .filter(|cred| cred.user_handle == user_handle)
            .cloned()
    }

    fn lookup_all(&self, credential_id: &[u8]) -> Vec<RegisteredCredential> {
        let index = self.index.lock().unwrap();
        index.by_id.get(credential_id).cloned().into_iter().collect()
    }
}
