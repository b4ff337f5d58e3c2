use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::algorithm::AlgorithmRegistry;
use super::digest::DigestRegistry;
use super::errors::{ProofError, Result};
use super::key_tag::calculate_key_tag;
use super::trust_anchor::TrustAnchorStore;
use crate::wire::{Dnskey, Ds, Name, ParseError, Proof, ProofStep, RecordType, RrSet};

/// Proof-chain validator.
///
/// Walks a caller-supplied ordered sequence of RRSet+RRSIG steps, extending
/// trust strictly downward from the configured anchors. Validation is a pure
/// function of (proof, anchor set, registries, now): nothing here mutates
/// shared state, and the first unmet condition aborts the whole proof.
pub struct ProofChainValidator {
    anchors: Arc<TrustAnchorStore>,
    algorithms: Arc<AlgorithmRegistry>,
    digests: Arc<DigestRegistry>,
}

/// The outcome of a successful chain validation.
#[derive(Debug, Clone)]
pub struct VerifiedProof {
    rrsets: Vec<RrSet>,
    /// Latest RRSIG inception across the accepted chain; doubles as the
    /// claim freshness timestamp.
    pub proven_at: u64,
    /// Earliest RRSIG expiration across the accepted chain.
    pub expires: u64,
}

impl VerifiedProof {
    /// The final step's RRSet, the proof's target.
    pub fn leaf(&self) -> &RrSet {
        self.rrsets
            .last()
            .expect("a validated proof has at least one step")
    }

    /// All validated RRSets of the given type, in submission order.
    pub fn rrsets_of_type(&self, rtype: RecordType) -> Vec<&RrSet> {
        self.rrsets.iter().filter(|s| s.rtype == rtype).collect()
    }
}

/// Keys proven usable for validation, addressed the way RRSIGs refer to
/// them: signer name, key tag, algorithm.
type TrustedKeys = HashMap<(Name, u16, u8), Dnskey>;

impl ProofChainValidator {
    pub fn new(
        anchors: Arc<TrustAnchorStore>,
        algorithms: Arc<AlgorithmRegistry>,
        digests: Arc<DigestRegistry>,
    ) -> Self {
        Self {
            anchors,
            algorithms,
            digests,
        }
    }

    /// Validate every step of `proof` against `now`, in submission order,
    /// with no reordering or backtracking. Returns the validated RRSets on
    /// success; fails closed on the first unmet condition.
    pub fn validate(&self, proof: &Proof, now: u64) -> Result<VerifiedProof> {
        if proof.steps.is_empty() {
            return Err(ProofError::NoChainOfTrust(Name::root()));
        }

        let mut trusted_keys: TrustedKeys = HashMap::new();
        let mut trusted_ds: HashMap<Name, Vec<Ds>> = HashMap::new();
        let mut proven_at = 0u64;
        let mut expires = u64::MAX;
        let mut rrsets = Vec::with_capacity(proof.steps.len());

        for (index, step) in proof.steps.iter().enumerate() {
            trace!(
                step = index,
                owner = %step.rrset.name,
                rtype = %step.rrset.rtype,
                signer = %step.sig.signer_name,
                "validating proof step"
            );
            self.validate_step(step, now, &mut trusted_keys, &mut trusted_ds)?;
            proven_at = proven_at.max(step.sig.inception as u64);
            expires = expires.min(step.sig.expiration as u64);
            rrsets.push(step.rrset.clone());
        }

        let leaf = &proof.steps[proof.steps.len() - 1].rrset;
        debug!(owner = %leaf.name, rtype = %leaf.rtype, proven_at, "proof chain validated");
        Ok(VerifiedProof {
            rrsets,
            proven_at,
            expires,
        })
    }

    fn validate_step(
        &self,
        step: &ProofStep,
        now: u64,
        trusted_keys: &mut TrustedKeys,
        trusted_ds: &mut HashMap<Name, Vec<Ds>>,
    ) -> Result<()> {
        let rrset = &step.rrset;
        let sig = &step.sig;

        // An RRSIG never covers another RRSIG, and a signature over a
        // different type than the set it accompanies is an ill-formed step.
        if rrset.rtype == RecordType::Rrsig || sig.type_covered != rrset.rtype {
            return Err(ParseError::CoverMismatch.into());
        }
        // Trust flows downward: the signer must be at or above the owner.
        if !sig.signer_name.is_ancestor_or_equal(&rrset.name) {
            return Err(ProofError::UntrustedSigner {
                signer: sig.signer_name.clone(),
                key_tag: sig.key_tag,
            });
        }

        // A DNSKEY set must chain from DS records already trusted for its
        // zone (or the anchors); matching keys seed the trusted set so the
        // zone's own KSK can validate the signature below.
        let zone_keys = if rrset.rtype == RecordType::Dnskey {
            Some(self.resolve_dnskeys(rrset, now, trusted_keys, trusted_ds)?)
        } else {
            None
        };

        let key = trusted_keys
            .get(&(sig.signer_name.clone(), sig.key_tag, sig.algorithm))
            .ok_or_else(|| ProofError::UntrustedSigner {
                signer: sig.signer_name.clone(),
                key_tag: sig.key_tag,
            })?;

        let signed_data = rrset.signed_data(sig)?;
        let verifier = self.algorithms.verifier(sig.algorithm)?;
        if !verifier.verify(&signed_data, &key.public_key, &sig.signature) {
            return Err(ProofError::InvalidSignature);
        }

        if now < sig.inception as u64 {
            return Err(ProofError::ProofNotYetValid);
        }
        if now > sig.expiration as u64 {
            return Err(ProofError::ProofExpired);
        }

        // Extend trust downward from the validated set.
        match rrset.rtype {
            RecordType::Dnskey => {
                // Any single DS match vouches for the whole validated set;
                // DNSSEC allows multiple concurrent signing keys.
                for key in zone_keys.expect("resolved above for DNSKEY sets") {
                    let tag = calculate_key_tag(&key);
                    trusted_keys.insert((rrset.name.clone(), tag, key.algorithm), key);
                }
            }
            RecordType::Ds => {
                let mut records = Vec::with_capacity(rrset.records().len());
                for record in rrset.records() {
                    records.push(Ds::parse(record)?);
                }
                trusted_ds.entry(rrset.name.clone()).or_default().extend(records);
            }
            _ => {}
        }
        Ok(())
    }

    /// Match a DNSKEY RRSet against the DS records trusted for its zone.
    ///
    /// Keys whose digest matches a DS are inserted into `trusted_keys`
    /// immediately, so the set's own covering signature can resolve its
    /// signer. Returns every usable zone key for promotion after the
    /// signature itself has been verified.
    fn resolve_dnskeys(
        &self,
        rrset: &RrSet,
        now: u64,
        trusted_keys: &mut TrustedKeys,
        trusted_ds: &HashMap<Name, Vec<Ds>>,
    ) -> Result<Vec<Dnskey>> {
        let mut ds_records = self.anchors.active_at(&rrset.name, now);
        if let Some(chained) = trusted_ds.get(&rrset.name) {
            ds_records.extend(chained.iter().cloned());
        }
        if ds_records.is_empty() {
            return Err(ProofError::NoChainOfTrust(rrset.name.clone()));
        }
        // Every DS uses a digest we cannot compute: a protocol gap, not a
        // broken chain.
        if !ds_records
            .iter()
            .any(|ds| self.digests.supports_ds_digest(ds.digest_type))
        {
            return Err(ProofError::UnsupportedDigest(ds_records[0].digest_type));
        }

        let mut zone_keys = Vec::with_capacity(rrset.records().len());
        let mut matched = false;
        for record in rrset.records() {
            let key = Dnskey::parse(record)?;
            // Only zone keys speaking DNSSEC may validate records.
            if !key.is_zone_key() || key.protocol != crate::wire::rdata::DNSKEY_PROTOCOL_DNSSEC {
                continue;
            }
            let tag = calculate_key_tag(&key);
            for ds in &ds_records {
                if ds.key_tag != tag || ds.algorithm != key.algorithm {
                    continue;
                }
                let Ok(digest) = self.digests.ds_digest(ds.digest_type) else {
                    continue;
                };
                let mut data = Vec::with_capacity(rrset.name.wire_len() + record.rdata.len());
                rrset.name.write_wire(&mut data);
                data.extend_from_slice(&record.rdata);
                if digest.verify(&data, &ds.digest) {
                    trace!(zone = %rrset.name, key_tag = tag, "DNSKEY matched trusted DS");
                    trusted_keys.insert((rrset.name.clone(), tag, key.algorithm), key.clone());
                    matched = true;
                    break;
                }
            }
            zone_keys.push(key);
        }

        if !matched {
            return Err(ProofError::NoChainOfTrust(rrset.name.clone()));
        }
        Ok(zone_keys)
    }
}
