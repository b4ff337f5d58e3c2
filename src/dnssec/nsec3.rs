use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, trace};

use super::digest::DigestRegistry;
use super::errors::{ProofError, Result};
use crate::wire::{Name, Nsec3, RecordType, RrSet};

/// Hard ceiling on NSEC3 iteration counts (RFC 5155 guidance); a record
/// demanding more work than this is rejected rather than hashed.
pub const MAX_NSEC3_ITERATIONS: u16 = 2500;

/// NSEC3 non-existence prover.
///
/// Consumes NSEC3 RRSets that have already passed chain validation and
/// decides whether they prove that no record of a given type exists at a
/// target name, via the closest-encloser construction of RFC 5155 §8.
pub struct Nsec3Prover {
    digests: Arc<DigestRegistry>,
    max_iterations: u16,
}

/// One usable NSEC3 record with its decoded owner hash.
struct HashedRecord {
    zone: Name,
    owner_hash: Vec<u8>,
    rdata: Nsec3,
}

impl Nsec3Prover {
    pub fn new(digests: Arc<DigestRegistry>) -> Self {
        Self {
            digests,
            max_iterations: MAX_NSEC3_ITERATIONS,
        }
    }

    pub fn with_iteration_limit(mut self, max_iterations: u16) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Confirm that `rrsets` prove no record of `rtype` exists at `name`.
    ///
    /// Either the name itself is matched by an NSEC3 record whose type
    /// bitmap omits `rtype` (and CNAME), or a closest-encloser pair shows
    /// the name does not exist at all. Anything less fails closed.
    pub fn prove_absence(&self, rrsets: &[&RrSet], name: &Name, rtype: RecordType) -> Result<()> {
        let records = self.collect(rrsets, name)?;
        if records.is_empty() {
            return Err(ProofError::ClosestEncloserMismatch);
        }

        // A record matching the full name means the name exists; absence
        // then hinges entirely on the type bitmap.
        for record in &records {
            let hash = self.hash_for(record, name)?;
            if hash == record.owner_hash {
                trace!(owner = %name, "NSEC3 matches target name exactly");
                if record.rdata.bitmap_contains(rtype)
                    || record.rdata.bitmap_contains(RecordType::Cname)
                {
                    return Err(ProofError::ClosestEncloserMismatch);
                }
                debug!(owner = %name, %rtype, "NSEC3 proves type absent at existing name");
                return Ok(());
            }
        }

        // Closest encloser: the nearest existing ancestor must be matched
        // exactly, and the next-closer name must fall in a covered gap.
        for depth in (0..name.label_count()).rev() {
            let ancestor = name.suffix(depth);
            for record in &records {
                let hash = self.hash_for(record, &ancestor)?;
                if hash != record.owner_hash {
                    continue;
                }
                // The encloser must still hold authority here: a DNAME, or a
                // delegation without SOA, would answer for the target some
                // other way.
                if record.rdata.bitmap_contains(RecordType::Dname)
                    || (record.rdata.bitmap_contains(RecordType::Ns)
                        && !record.rdata.bitmap_contains(RecordType::Soa))
                {
                    return Err(ProofError::ClosestEncloserMismatch);
                }
                let next_closer = name.suffix(depth + 1);
                let next_hash = self.hash_for(record, &next_closer)?;
                if records.iter().any(|r| {
                    r.zone == record.zone
                        && covers(&r.owner_hash, &r.rdata.next_hashed_owner, &next_hash)
                }) {
                    debug!(owner = %name, encloser = %ancestor, "NSEC3 closest encloser proof accepted");
                    return Ok(());
                }
                return Err(ProofError::ClosestEncloserMismatch);
            }
        }

        Err(ProofError::ClosestEncloserMismatch)
    }

    /// Decode the validated RRSets into usable records, dropping those from
    /// zones that are not ancestors of the target.
    fn collect(&self, rrsets: &[&RrSet], name: &Name) -> Result<Vec<HashedRecord>> {
        let mut out = Vec::new();
        for rrset in rrsets {
            if rrset.rtype != RecordType::Nsec3 || rrset.name.is_root() {
                continue;
            }
            let zone = rrset.name.parent();
            if !zone.is_ancestor_or_equal(name) {
                continue;
            }
            let owner_hash = decode_owner_hash(&rrset.name)?;
            for record in rrset.records() {
                let rdata = Nsec3::parse(record)?;
                if rdata.iterations > self.max_iterations {
                    return Err(ProofError::UnsupportedDigest(rdata.hash_algorithm));
                }
                out.push(HashedRecord {
                    zone: zone.clone(),
                    owner_hash: owner_hash.clone(),
                    rdata,
                });
            }
        }
        Ok(out)
    }

    fn hash_for(&self, record: &HashedRecord, name: &Name) -> Result<Vec<u8>> {
        self.digests.nsec3_hash(
            record.rdata.hash_algorithm,
            name,
            &record.rdata.salt,
            record.rdata.iterations,
        )
    }
}

/// The NSEC3 owner name's first label is the base32hex-encoded hash.
fn decode_owner_hash(owner: &Name) -> Result<Vec<u8>> {
    let label = owner.labels().first().ok_or(ProofError::ClosestEncloserMismatch)?;
    base32::decode(
        base32::Alphabet::Rfc4648Hex { padding: false },
        &label.to_ascii_uppercase(),
    )
    .filter(|hash| !hash.is_empty())
    .ok_or(ProofError::ClosestEncloserMismatch)
}

/// Big-endian byte-order comparison. Hash ordering wraps at the maximum
/// value, so this never goes through a native wide-integer type.
fn hash_cmp(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Whether `hash` falls strictly between `owner` and `next` in the
/// wraparound-aware NSEC3 ordering. The hash equal to either endpoint is
/// NOT covered: it names an existing record.
fn covers(owner: &[u8], next: &[u8], hash: &[u8]) -> bool {
    match hash_cmp(owner, next) {
        Ordering::Less => {
            hash_cmp(owner, hash) == Ordering::Less && hash_cmp(hash, next) == Ordering::Less
        }
        // The record spanning the top of the hash space, or a single-record
        // zone covering everything except its own owner.
        Ordering::Greater | Ordering::Equal => {
            hash_cmp(owner, hash) == Ordering::Less || hash_cmp(hash, next) == Ordering::Less
        }
    }
}
