use thiserror::Error;

use crate::wire::{Name, ParseError};

/// Proof rejection conditions.
///
/// Every rejection is terminal: the validator is a pure function of its
/// input, so the caller must construct a corrected proof and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("malformed resource record: {0}")]
    MalformedRecord(#[from] ParseError),

    #[error("unsupported signature algorithm {0}")]
    UnsupportedAlgorithm(u8),

    #[error("unsupported digest type {0}")]
    UnsupportedDigest(u8),

    #[error("signer {signer} key tag {key_tag} is not trusted")]
    UntrustedSigner { signer: Name, key_tag: u16 },

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("proof has expired")]
    ProofExpired,

    #[error("proof is not yet valid")]
    ProofNotYetValid,

    #[error("no chain of trust to {0}")]
    NoChainOfTrust(Name),

    #[error("closest encloser proof does not cover the target")]
    ClosestEncloserMismatch,
}

pub type Result<T> = std::result::Result<T, ProofError>;
