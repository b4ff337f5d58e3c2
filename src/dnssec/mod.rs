//! DNSSEC proof-chain verification: registries, trust anchors, the chain
//! validator and the NSEC3 non-existence prover.

pub mod algorithm;
pub mod digest;
pub mod errors;
pub mod key_tag;
pub mod nsec3;
pub mod trust_anchor;
pub mod validator;

pub use algorithm::{AlgorithmRegistry, SignatureVerifier};
pub use digest::{DigestRegistry, DigestVerifier};
pub use errors::ProofError;
pub use key_tag::calculate_key_tag;
pub use nsec3::{MAX_NSEC3_ITERATIONS, Nsec3Prover};
pub use trust_anchor::{TrustAnchor, TrustAnchorStore};
pub use validator::{ProofChainValidator, VerifiedProof};
