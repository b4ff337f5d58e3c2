//! DNSSEC proof-chain verification and DNS-proven ownership claims.
//!
//! A caller submits an ordered chain of RRSet+RRSIG proof steps; the
//! validator replays trust from hard-coded root anchors down to a leaf
//! record with no resolver access, and the registrar applies the claim the
//! leaf encodes to an external name registry under strict freshness rules.

pub mod config;
pub mod dnssec;
pub mod registrar;
pub mod wire;

pub use config::RegistrarConfig;
pub use dnssec::{ProofChainValidator, ProofError};
pub use registrar::{ClaimError, DnsRegistrar};
pub use wire::Proof;
