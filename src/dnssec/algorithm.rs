use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use ring::signature;
use tracing::{info, warn};

use super::errors::{ProofError, Result};

/// A signature verification function dispatched by DNSSEC algorithm number.
///
/// `public_key` is the DNSKEY public-key field in its wire encoding; each
/// implementation owns the conversion to whatever its backend expects.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &[u8], public_key: &[u8], sig: &[u8]) -> bool;
}

/// DNSSEC algorithm numbers (RFC 4034, 5155, 5702, 6605, 8080)
pub mod algorithm_id {
    pub const RSA_SHA1: u8 = 5;
    pub const RSA_SHA1_NSEC3: u8 = 7;
    pub const RSA_SHA256: u8 = 8;
    pub const RSA_SHA512: u8 = 10;
    pub const ECDSA_P256_SHA256: u8 = 13;
    pub const ECDSA_P384_SHA384: u8 = 14;
    pub const ED25519: u8 = 15;
}

/// Split an RFC 3110 RSA public key into its exponent and modulus.
///
/// A zero first octet means the exponent length is in the following two
/// octets; otherwise the first octet is the length itself.
fn rsa_components(public_key: &[u8]) -> Option<signature::RsaPublicKeyComponents<&[u8]>> {
    if public_key.len() <= 3 {
        return None;
    }
    let (exponent_len, pos) = if public_key[0] == 0 {
        (
            ((public_key[1] as usize) << 8) | public_key[2] as usize,
            3usize,
        )
    } else {
        (public_key[0] as usize, 1usize)
    };
    if exponent_len == 0 || public_key.len() <= pos + exponent_len {
        return None;
    }
    Some(signature::RsaPublicKeyComponents {
        n: &public_key[pos + exponent_len..],
        e: &public_key[pos..pos + exponent_len],
    })
}

struct RsaVerifier(&'static signature::RsaParameters);

impl SignatureVerifier for RsaVerifier {
    fn verify(&self, message: &[u8], public_key: &[u8], sig: &[u8]) -> bool {
        match rsa_components(public_key) {
            Some(components) => components.verify(self.0, message, sig).is_ok(),
            None => false,
        }
    }
}

struct EcdsaVerifier(&'static dyn signature::VerificationAlgorithm);

impl SignatureVerifier for EcdsaVerifier {
    fn verify(&self, message: &[u8], public_key: &[u8], sig: &[u8]) -> bool {
        // DNSKEY carries the bare point; ring wants the uncompressed-point tag
        let mut key = Vec::with_capacity(public_key.len() + 1);
        key.push(0x04);
        key.extend_from_slice(public_key);
        signature::UnparsedPublicKey::new(self.0, &key)
            .verify(message, sig)
            .is_ok()
    }
}

struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &[u8], public_key: &[u8], sig: &[u8]) -> bool {
        signature::UnparsedPublicKey::new(&signature::ED25519, public_key)
            .verify(message, sig)
            .is_ok()
    }
}

/// Registry of signature algorithm implementations, keyed by DNSSEC
/// algorithm number.
///
/// A missing entry is a hard `UnsupportedAlgorithm` failure, distinct from a
/// signature that fails to verify, so callers can tell a protocol gap from a
/// forged proof. Multiple IDs may share one implementation.
pub struct AlgorithmRegistry {
    table: RwLock<HashMap<u8, Arc<dyn SignatureVerifier>>>,
}

impl AlgorithmRegistry {
    /// A registry preloaded with the algorithms this crate ships.
    pub fn new() -> Self {
        let registry = Self::empty();
        // 5 and 7 differ only in NSEC3 semantics; one verifier serves both
        let rsa_sha1: Arc<dyn SignatureVerifier> = Arc::new(RsaVerifier(
            &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
        ));
        registry.register(algorithm_id::RSA_SHA1, rsa_sha1.clone());
        registry.register(algorithm_id::RSA_SHA1_NSEC3, rsa_sha1);
        registry.register(
            algorithm_id::RSA_SHA256,
            Arc::new(RsaVerifier(
                &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
            )),
        );
        registry.register(
            algorithm_id::RSA_SHA512,
            Arc::new(RsaVerifier(
                &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
            )),
        );
        registry.register(
            algorithm_id::ECDSA_P256_SHA256,
            Arc::new(EcdsaVerifier(&signature::ECDSA_P256_SHA256_FIXED)),
        );
        registry.register(
            algorithm_id::ECDSA_P384_SHA384,
            Arc::new(EcdsaVerifier(&signature::ECDSA_P384_SHA384_FIXED)),
        );
        registry.register(algorithm_id::ED25519, Arc::new(Ed25519Verifier));
        registry
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Register an implementation for an algorithm number. Privileged.
    pub fn register(&self, id: u8, verifier: Arc<dyn SignatureVerifier>) {
        if self.table.write().insert(id, verifier).is_some() {
            warn!(id, "replaced existing signature algorithm implementation");
        } else {
            info!(id, "registered signature algorithm implementation");
        }
    }

    pub fn verifier(&self, id: u8) -> Result<Arc<dyn SignatureVerifier>> {
        self.table
            .read()
            .get(&id)
            .cloned()
            .ok_or(ProofError::UnsupportedAlgorithm(id))
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
