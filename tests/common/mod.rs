//! Shared fixtures: a deterministic Ed25519-signed zone hierarchy
//! (root -> com -> example.com) and helpers for packing proof submissions.

#![allow(dead_code)]

use dnsclaim::dnssec::{TrustAnchor, calculate_key_tag};
use dnsclaim::wire::{Dnskey, Ds, Name, Proof, RecordClass, RecordType, ResourceRecord, Rrsig};
use ring::signature::{Ed25519KeyPair, KeyPair};

pub const INCEPTION: u32 = 1_700_000_000;
pub const EXPIRATION: u32 = 1_700_100_000;
pub const NOW: u64 = 1_700_050_000;

/// Route `tracing` output through the test harness when RUST_LOG is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const ED25519: u8 = 15;
const KSK_FLAGS: u16 = 257;
const ZSK_FLAGS: u16 = 256;

/// A signing key for one zone, with its DNSKEY record.
pub struct ZoneKey {
    pub name: Name,
    pub keypair: Ed25519KeyPair,
    pub record: ResourceRecord,
    pub key_tag: u16,
}

pub fn zone_key(name: &str, flags: u16, seed: u8) -> ZoneKey {
    let keypair = Ed25519KeyPair::from_seed_unchecked(&[seed; 32]).unwrap();
    let name = Name::parse(name).unwrap();

    let mut rdata = Vec::new();
    rdata.extend_from_slice(&flags.to_be_bytes());
    rdata.push(3);
    rdata.push(ED25519);
    rdata.extend_from_slice(keypair.public_key().as_ref());

    let record = ResourceRecord {
        name: name.clone(),
        rtype: RecordType::Dnskey,
        class: RecordClass::In,
        ttl: 3600,
        rdata,
    };
    let key_tag = calculate_key_tag(&Dnskey::parse(&record).unwrap());
    ZoneKey {
        name,
        keypair,
        record,
        key_tag,
    }
}

/// SHA-256 digest of `owner || DNSKEY RDATA`, the DS digest input.
pub fn ds_digest(key: &ZoneKey) -> Vec<u8> {
    let mut data = Vec::new();
    key.name.write_wire(&mut data);
    data.extend_from_slice(&key.record.rdata);
    ring::digest::digest(&ring::digest::SHA256, &data)
        .as_ref()
        .to_vec()
}

/// DS record delegating to `key`'s zone, placed at that zone's apex.
pub fn ds_record(key: &ZoneKey) -> ResourceRecord {
    let mut rdata = Vec::new();
    rdata.extend_from_slice(&key.key_tag.to_be_bytes());
    rdata.push(ED25519);
    rdata.push(2);
    rdata.extend_from_slice(&ds_digest(key));
    ResourceRecord {
        name: key.name.clone(),
        rtype: RecordType::Ds,
        class: RecordClass::In,
        ttl: 3600,
        rdata,
    }
}

pub fn txt_record(name: &str, text: &[u8]) -> ResourceRecord {
    let mut rdata = Vec::new();
    for chunk in text.chunks(255) {
        rdata.push(chunk.len() as u8);
        rdata.extend_from_slice(chunk);
    }
    ResourceRecord {
        name: Name::parse(name).unwrap(),
        rtype: RecordType::Txt,
        class: RecordClass::In,
        ttl: 300,
        rdata,
    }
}

/// NSEC3 RDATA with SHA-1 parameters.
pub fn nsec3_rdata(
    iterations: u16,
    salt: &[u8],
    next_hashed: &[u8],
    bitmap_types: &[u16],
) -> Vec<u8> {
    let mut rdata = Vec::new();
    rdata.push(1); // SHA-1
    rdata.push(0);
    rdata.extend_from_slice(&iterations.to_be_bytes());
    rdata.push(salt.len() as u8);
    rdata.extend_from_slice(salt);
    rdata.push(next_hashed.len() as u8);
    rdata.extend_from_slice(next_hashed);
    rdata.extend_from_slice(&type_bitmap(bitmap_types));
    rdata
}

/// Window-block type bitmap (RFC 4034 §4.1.2) for types below 256.
pub fn type_bitmap(types: &[u16]) -> Vec<u8> {
    if types.is_empty() {
        return Vec::new();
    }
    let max = *types.iter().max().unwrap() as usize;
    assert!(max < 256, "fixture bitmap only covers window 0");
    let len = max / 8 + 1;
    let mut bits = vec![0u8; len];
    for &t in types {
        bits[(t / 8) as usize] |= 0x80 >> (t % 8);
    }
    let mut out = vec![0, len as u8];
    out.extend_from_slice(&bits);
    out
}

/// Sign a record set and return the covering RRSIG record.
pub fn sign_rrset(
    records: &[ResourceRecord],
    signer: &ZoneKey,
    inception: u32,
    expiration: u32,
) -> ResourceRecord {
    let labels = records[0].name.label_count() as u8;
    sign_rrset_with_labels(records, signer, inception, expiration, labels)
}

/// Like [`sign_rrset`] but with an explicit RRSIG label count, for wildcard
/// expansion fixtures.
pub fn sign_rrset_with_labels(
    records: &[ResourceRecord],
    signer: &ZoneKey,
    inception: u32,
    expiration: u32,
    labels: u8,
) -> ResourceRecord {
    let rrset = dnsclaim::wire::RrSet::from_records(records.to_vec()).unwrap();
    let mut sig = Rrsig {
        type_covered: rrset.rtype,
        algorithm: ED25519,
        labels,
        original_ttl: records[0].ttl,
        expiration,
        inception,
        key_tag: signer.key_tag,
        signer_name: signer.name.clone(),
        signature: Vec::new(),
    };
    let message = rrset.signed_data(&sig).unwrap();
    sig.signature = signer.keypair.sign(&message).as_ref().to_vec();

    let mut rdata = Vec::new();
    sig.write_rdata_prefix(&mut rdata);
    rdata.extend_from_slice(&sig.signature);
    ResourceRecord {
        name: rrset.name.clone(),
        rtype: RecordType::Rrsig,
        class: RecordClass::In,
        ttl: records[0].ttl,
        rdata,
    }
}

/// Packs proof steps into the byte-packed submission format.
#[derive(Default)]
pub struct ProofBuilder {
    buf: Vec<u8>,
}

impl ProofBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_step(&mut self, records: &[ResourceRecord], sig: &ResourceRecord) -> &mut Self {
        let mut rrset_bytes = Vec::new();
        for record in records {
            record.write(&mut rrset_bytes);
        }
        let mut sig_bytes = Vec::new();
        sig.write(&mut sig_bytes);

        self.buf
            .extend_from_slice(&(rrset_bytes.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(&rrset_bytes);
        self.buf
            .extend_from_slice(&(sig_bytes.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(&sig_bytes);
        self
    }

    pub fn push_signed(
        &mut self,
        records: &[ResourceRecord],
        signer: &ZoneKey,
        inception: u32,
        expiration: u32,
    ) -> &mut Self {
        let sig = sign_rrset(records, signer, inception, expiration);
        self.push_step(records, &sig)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn build(&self) -> Proof {
        Proof::parse(&self.buf).unwrap()
    }
}

/// A root -> com -> example.com signing hierarchy with deterministic keys.
pub struct Hierarchy {
    pub root_ksk: ZoneKey,
    pub root_zsk: ZoneKey,
    pub tld_ksk: ZoneKey,
    pub tld_zsk: ZoneKey,
    pub zone_ksk: ZoneKey,
    pub zone_zsk: ZoneKey,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            root_ksk: zone_key(".", KSK_FLAGS, 1),
            root_zsk: zone_key(".", ZSK_FLAGS, 2),
            tld_ksk: zone_key("com", KSK_FLAGS, 3),
            tld_zsk: zone_key("com", ZSK_FLAGS, 4),
            zone_ksk: zone_key("example.com", KSK_FLAGS, 5),
            zone_zsk: zone_key("example.com", ZSK_FLAGS, 6),
        }
    }

    /// The root anchor: a DS record for the root KSK.
    pub fn anchors(&self) -> Vec<TrustAnchor> {
        vec![TrustAnchor::new(
            Name::root(),
            Ds {
                key_tag: self.root_ksk.key_tag,
                algorithm: ED25519,
                digest_type: 2,
                digest: ds_digest(&self.root_ksk),
            },
        )]
    }

    /// The five trust-extension steps from the root anchors down to the
    /// example.com zone keys, leaving the leaf to the caller.
    pub fn builder_through_zone(&self) -> ProofBuilder {
        let mut builder = ProofBuilder::new();
        builder
            .push_signed(
                &[self.root_ksk.record.clone(), self.root_zsk.record.clone()],
                &self.root_ksk,
                INCEPTION,
                EXPIRATION,
            )
            .push_signed(&[ds_record(&self.tld_ksk)], &self.root_zsk, INCEPTION, EXPIRATION)
            .push_signed(
                &[self.tld_ksk.record.clone(), self.tld_zsk.record.clone()],
                &self.tld_ksk,
                INCEPTION,
                EXPIRATION,
            )
            .push_signed(&[ds_record(&self.zone_ksk)], &self.tld_zsk, INCEPTION, EXPIRATION)
            .push_signed(
                &[self.zone_ksk.record.clone(), self.zone_zsk.record.clone()],
                &self.zone_ksk,
                INCEPTION,
                EXPIRATION,
            );
        builder
    }

    /// A complete proof terminating at `leaf` signed by the example.com ZSK.
    pub fn proof_for(&self, leaf: &[ResourceRecord]) -> Proof {
        let mut builder = self.builder_through_zone();
        builder.push_signed(leaf, &self.zone_zsk, INCEPTION, EXPIRATION);
        builder.build()
    }
}
