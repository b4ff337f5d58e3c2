use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::errors::{ProofError, Result};
use crate::wire::Name;

/// A digest function dispatched by numeric identifier.
///
/// Implementations are pure: the registry never validates anything itself,
/// it only routes by ID.
pub trait DigestVerifier: Send + Sync {
    fn digest_len(&self) -> usize;

    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Recompute-and-compare, the operation DS verification needs.
    fn verify(&self, data: &[u8], expected: &[u8]) -> bool {
        self.hash(data) == expected
    }
}

struct RingDigest {
    algorithm: &'static ring::digest::Algorithm,
    len: usize,
}

impl DigestVerifier for RingDigest {
    fn digest_len(&self) -> usize {
        self.len
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        ring::digest::digest(self.algorithm, data).as_ref().to_vec()
    }
}

/// Registry of digest implementations.
///
/// Two tables because IANA assigns DS digest types and NSEC3 hash algorithms
/// from different number spaces: DS type 1 and NSEC3 algorithm 1 are both
/// SHA-1 only by coincidence.
///
/// Registration is a privileged, logged operation; lookup is all the
/// validation path can reach.
pub struct DigestRegistry {
    ds: RwLock<HashMap<u8, Arc<dyn DigestVerifier>>>,
    nsec3: RwLock<HashMap<u8, Arc<dyn DigestVerifier>>>,
}

/// DS digest type numbers (RFC 4034, 4509, 6605)
pub mod digest_type {
    pub const SHA1: u8 = 1;
    pub const SHA256: u8 = 2;
    pub const SHA384: u8 = 4;
}

/// NSEC3 hash algorithm numbers (RFC 5155)
pub mod nsec3_hash {
    pub const SHA1: u8 = 1;
}

impl DigestRegistry {
    /// A registry preloaded with the standard assignments.
    pub fn new() -> Self {
        let registry = Self::empty();
        let sha1: Arc<dyn DigestVerifier> = Arc::new(RingDigest {
            algorithm: &ring::digest::SHA1_FOR_LEGACY_USE_ONLY,
            len: 20,
        });
        registry.register(digest_type::SHA1, sha1.clone());
        registry.register(
            digest_type::SHA256,
            Arc::new(RingDigest {
                algorithm: &ring::digest::SHA256,
                len: 32,
            }),
        );
        registry.register(
            digest_type::SHA384,
            Arc::new(RingDigest {
                algorithm: &ring::digest::SHA384,
                len: 48,
            }),
        );
        registry.register_nsec3(nsec3_hash::SHA1, sha1);
        registry
    }

    /// A registry with nothing registered, for tests and bespoke deployments.
    pub fn empty() -> Self {
        Self {
            ds: RwLock::new(HashMap::new()),
            nsec3: RwLock::new(HashMap::new()),
        }
    }

    /// Register a DS digest implementation. Privileged.
    pub fn register(&self, id: u8, verifier: Arc<dyn DigestVerifier>) {
        if self.ds.write().insert(id, verifier).is_some() {
            warn!(id, "replaced existing DS digest implementation");
        } else {
            info!(id, "registered DS digest implementation");
        }
    }

    /// Register an NSEC3 hash implementation. Privileged.
    pub fn register_nsec3(&self, id: u8, verifier: Arc<dyn DigestVerifier>) {
        if self.nsec3.write().insert(id, verifier).is_some() {
            warn!(id, "replaced existing NSEC3 hash implementation");
        } else {
            info!(id, "registered NSEC3 hash implementation");
        }
    }

    pub fn ds_digest(&self, id: u8) -> Result<Arc<dyn DigestVerifier>> {
        self.ds
            .read()
            .get(&id)
            .cloned()
            .ok_or(ProofError::UnsupportedDigest(id))
    }

    pub fn supports_ds_digest(&self, id: u8) -> bool {
        self.ds.read().contains_key(&id)
    }

    /// The iterated, salted owner-name hash NSEC3 uses (RFC 5155 §5):
    /// `H(name || salt)`, then `iterations` more rounds of `H(prev || salt)`.
    pub fn nsec3_hash(
        &self,
        id: u8,
        name: &Name,
        salt: &[u8],
        iterations: u16,
    ) -> Result<Vec<u8>> {
        let digest = self
            .nsec3
            .read()
            .get(&id)
            .cloned()
            .ok_or(ProofError::UnsupportedDigest(id))?;

        let mut input = Vec::with_capacity(name.wire_len() + salt.len());
        name.write_wire(&mut input);
        input.extend_from_slice(salt);
        let mut hash = digest.hash(&input);
        for _ in 0..iterations {
            hash.extend_from_slice(salt);
            hash = digest.hash(&hash);
        }
        Ok(hash)
    }
}

impl Default for DigestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
