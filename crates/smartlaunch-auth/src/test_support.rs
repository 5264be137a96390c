//! Shared fixtures for unit tests.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use serde_json::Value;

use crate::token::jwt::{ClaimVerifier, Claims, JwtError};
use crate::token::keys::IssuerKey;

/// RSA key generation is slow in debug builds, so every test shares one key.
pub fn rsa_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA key")
    })
}

pub fn rsa_private_pem() -> String {
    rsa_private_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode RSA key")
        .to_string()
}

/// Issuer key for verification plus the matching signing key.
pub fn rsa_issuer() -> (IssuerKey, EncodingKey) {
    let pem = rsa_private_pem();
    let issuer_key = IssuerKey::from_pem(&pem).expect("issuer key");
    let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("encoding key");
    (issuer_key, encoding_key)
}

pub fn sign_hs256(claims: &Value, secret: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("sign HS256")
}

pub fn sign_rs256(claims: &Value, key: &EncodingKey) -> String {
    encode(&Header::new(Algorithm::RS256), claims, key).expect("sign RS256")
}

pub fn claims(value: Value) -> Claims {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

/// Verifier that always returns the same result.
pub struct FixedVerifier {
    result: Result<Claims, JwtError>,
}

impl FixedVerifier {
    pub fn new(result: Result<Claims, JwtError>) -> Self {
        Self { result }
    }
}

impl ClaimVerifier for FixedVerifier {
    fn verify(&self, _token: &str) -> Result<Claims, JwtError> {
        self.result.clone()
    }
}

/// Verifier that records how many times it was called.
pub struct CountingVerifier {
    inner: FixedVerifier,
    calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn new(result: Result<Claims, JwtError>) -> Self {
        Self {
            inner: FixedVerifier::new(result),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClaimVerifier for CountingVerifier {
    fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token)
    }
}
