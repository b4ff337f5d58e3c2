//! The claim orchestrator: consumes validated proof chains and applies the
//! resulting ownership assignments to the external name registry.

pub mod claim;
pub mod node;
pub mod registry;
pub mod suffix;

pub use claim::{AddressRecordParser, CLAIM_LABEL, OwnerRecordParser};
pub use node::{Address, NodeId};
pub use registry::{InMemoryRegistry, NameRegistry};
pub use suffix::{PublicSuffixPolicy, SuffixList};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, RegistrarConfig};
use crate::dnssec::{
    AlgorithmRegistry, DigestRegistry, Nsec3Prover, ProofChainValidator, ProofError,
    TrustAnchorStore,
};
use crate::wire::{Name, Proof, RecordType};

/// Claim rejection conditions. Like proof rejections, all are terminal; a
/// failed claim leaves the registry and freshness state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("{0} is not under an allowed public suffix")]
    NotPublicSuffix(Name),

    #[error("proof terminates at {found}, expected {expected}")]
    TargetMismatch { expected: Name, found: Name },

    #[error("no owner record found for {0}")]
    NoOwnerRecord(Name),

    #[error("claim for node {node} is stale: proven at {proven_at}, prior claim at {prior}")]
    StaleClaim {
        node: NodeId,
        proven_at: u64,
        prior: u64,
    },
}

/// An applied ownership assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub node: NodeId,
    pub owner: Address,
    pub proven_at: u64,
}

/// The DNS registrar: proof in, registry write out.
///
/// Per target node the state machine is
/// `Unclaimed -> Claimed(owner, proven_at) -> Claimed(owner', proven_at') ...`
/// and a transition is accepted only when the new proof is strictly fresher
/// than the previous one for that node.
pub struct DnsRegistrar {
    validator: ProofChainValidator,
    prover: Nsec3Prover,
    registry: Arc<dyn NameRegistry>,
    suffixes: Arc<dyn PublicSuffixPolicy>,
    parser: Box<dyn OwnerRecordParser>,
    proven: RwLock<HashMap<NodeId, u64>>,
    /// Pinned clock for tests; `None` uses the system clock
    current_time: Option<u64>,
}

impl DnsRegistrar {
    /// A registrar with production defaults: IANA root anchors, the shipped
    /// algorithm and digest registries, and the default claim grammar.
    pub fn new(registry: Arc<dyn NameRegistry>, suffixes: Arc<dyn PublicSuffixPolicy>) -> Self {
        let digests = Arc::new(DigestRegistry::new());
        Self::with_parts(
            Arc::new(TrustAnchorStore::new()),
            Arc::new(AlgorithmRegistry::new()),
            digests,
            registry,
            suffixes,
        )
    }

    /// A registrar built from configuration (test networks pin their own
    /// anchors and suffix rules this way).
    pub fn from_config(
        config: &RegistrarConfig,
        registry: Arc<dyn NameRegistry>,
    ) -> Result<Self, ConfigError> {
        let anchors = Arc::new(TrustAnchorStore::with_anchors(config.trust_anchors()?));
        let digests = Arc::new(DigestRegistry::new());
        Ok(Self {
            validator: ProofChainValidator::new(
                anchors,
                Arc::new(AlgorithmRegistry::new()),
                digests.clone(),
            ),
            prover: Nsec3Prover::new(digests).with_iteration_limit(config.max_nsec3_iterations),
            registry,
            suffixes: Arc::new(config.suffix_list()),
            parser: Box::new(AddressRecordParser),
            proven: RwLock::new(HashMap::new()),
            current_time: None,
        })
    }

    pub fn with_parts(
        anchors: Arc<TrustAnchorStore>,
        algorithms: Arc<AlgorithmRegistry>,
        digests: Arc<DigestRegistry>,
        registry: Arc<dyn NameRegistry>,
        suffixes: Arc<dyn PublicSuffixPolicy>,
    ) -> Self {
        Self {
            validator: ProofChainValidator::new(anchors, algorithms, digests.clone()),
            prover: Nsec3Prover::new(digests),
            registry,
            suffixes,
            parser: Box::new(AddressRecordParser),
            proven: RwLock::new(HashMap::new()),
            current_time: None,
        }
    }

    /// Swap the TXT claim grammar.
    pub fn with_parser(mut self, parser: Box<dyn OwnerRecordParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Pin the clock, for tests.
    pub fn set_current_time(&mut self, now: u64) {
        self.current_time = Some(now);
    }

    fn now(&self) -> u64 {
        self.current_time.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
        })
    }

    /// Validate `proof` and assign ownership of `name`'s node to the address
    /// published in the TXT record at `_ens.<name>`.
    pub fn prove_and_claim(&self, name: &Name, proof: &Proof) -> Result<Claim, ClaimError> {
        self.check_suffix(name)?;
        let now = self.now();
        debug!(%name, steps = proof.steps.len(), "validating ownership claim");

        let verified = self.validator.validate(proof, now)?;
        let target = Name::prefixed(CLAIM_LABEL, name).map_err(ProofError::from)?;
        let leaf = verified.leaf();
        if leaf.name != target || leaf.rtype != RecordType::Txt {
            return Err(ClaimError::TargetMismatch {
                expected: target,
                found: leaf.name.clone(),
            });
        }

        let owner = claim::extract_owner(leaf, self.parser.as_ref())
            .ok_or_else(|| ClaimError::NoOwnerRecord(name.clone()))?;
        self.commit(name, owner, verified.proven_at)
    }

    /// Validate `proof` as an NSEC3 demonstration that the claim TXT record
    /// is deliberately absent, and reset the node's owner.
    pub fn prove_and_remove(&self, name: &Name, proof: &Proof) -> Result<Claim, ClaimError> {
        self.check_suffix(name)?;
        let now = self.now();
        debug!(%name, steps = proof.steps.len(), "validating ownership removal");

        let verified = self.validator.validate(proof, now)?;
        let target = Name::prefixed(CLAIM_LABEL, name).map_err(ProofError::from)?;
        let nsec3_sets = verified.rrsets_of_type(RecordType::Nsec3);
        self.prover
            .prove_absence(&nsec3_sets, &target, RecordType::Txt)?;
        self.commit(name, Address::ZERO, verified.proven_at)
    }

    /// The suffix gate: the name must sit under an allowed public suffix and
    /// must not be a public suffix itself.
    fn check_suffix(&self, name: &Name) -> Result<(), ClaimError> {
        if self.suffixes.is_public_suffix(name) {
            return Err(ClaimError::NotPublicSuffix(name.clone()));
        }
        let under_allowed = (1..name.label_count())
            .any(|count| self.suffixes.is_public_suffix(&name.suffix(count)));
        if !under_allowed {
            warn!(%name, "claim rejected by public suffix gate");
            return Err(ClaimError::NotPublicSuffix(name.clone()));
        }
        Ok(())
    }

    /// The single state transition. Freshness is checked and written under
    /// one lock so a claim either fully lands or leaves no trace.
    fn commit(&self, name: &Name, owner: Address, proven_at: u64) -> Result<Claim, ClaimError> {
        let node = NodeId::namehash(name);
        let mut proven = self.proven.write();
        let prior = proven.get(&node).copied().unwrap_or(0);
        if proven_at <= prior {
            return Err(ClaimError::StaleClaim {
                node,
                proven_at,
                prior,
            });
        }
        self.registry.set_owner(node, owner);
        proven.insert(node, proven_at);
        info!(%name, %node, %owner, proven_at, "ownership claim applied");
        Ok(Claim {
            node,
            owner,
            proven_at,
        })
    }
}
