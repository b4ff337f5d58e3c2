//! DNS wire-format codec for proof submissions.
//!
//! Proofs arrive as a byte-packed sequence of steps. Each step is an RRSet
//! (one or more records sharing name/type/class) followed by the RRSIG record
//! covering it, both length-prefixed:
//!
//! ```text
//! step := u16 rrset_len | rrset wire bytes | u16 sig_len | RRSIG wire bytes
//! ```
//!
//! Names must be pre-expanded by the submitter; compression pointers are
//! rejected outright.

pub mod enums;
pub mod name;
pub mod rdata;
pub mod record;

pub use enums::{RecordClass, RecordType};
pub use name::Name;
pub use rdata::{Dnskey, Ds, Nsec3, Rrsig, Txt};
pub use record::{ResourceRecord, RrSet};

use thiserror::Error;

/// Wire decoding failures. All of these surface to callers as the
/// `MalformedRecord` proof-rejection condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("record data is truncated")]
    Truncated,

    #[error("invalid label length {0}")]
    InvalidLabelLength(u8),

    #[error("name exceeds 255 octets")]
    NameTooLong,

    #[error("invalid label encoding")]
    InvalidLabel,

    #[error("compressed name in proof stream")]
    CompressedName,

    #[error("record set has no records")]
    EmptyRrSet,

    #[error("record set mixes owner name, type or class")]
    MixedRrSet,

    #[error("unexpected record type {0}")]
    UnexpectedType(u16),

    #[error("proof step carries no signature")]
    MissingSignature,

    #[error("signature does not cover the record set type")]
    CoverMismatch,

    #[error("signature label count exceeds the owner name")]
    InvalidWildcard,

    #[error("trailing bytes after record data")]
    TrailingBytes,
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// One proof step: a record set plus the signature covering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub rrset: RrSet,
    pub sig: Rrsig,
}

/// A decoded proof submission: the ordered steps exactly as the caller
/// packed them. Validation order is submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub steps: Vec<ProofStep>,
}

impl Proof {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut steps = Vec::new();
        let mut pos = 0;
        while pos < buf.len() {
            steps.push(Self::parse_step(buf, &mut pos)?);
        }
        Ok(Self { steps })
    }

    fn parse_step(buf: &[u8], pos: &mut usize) -> Result<ProofStep> {
        let rrset_bytes = read_chunk(buf, pos)?;
        let sig_bytes = read_chunk(buf, pos)?;
        if sig_bytes.is_empty() {
            return Err(ParseError::MissingSignature);
        }

        let mut records = Vec::new();
        let mut rr_pos = 0;
        while rr_pos < rrset_bytes.len() {
            records.push(ResourceRecord::parse(rrset_bytes, &mut rr_pos)?);
        }
        let rrset = RrSet::from_records(records)?;

        let mut sig_pos = 0;
        let sig_record = ResourceRecord::parse(sig_bytes, &mut sig_pos)?;
        if sig_pos != sig_bytes.len() {
            return Err(ParseError::TrailingBytes);
        }
        if sig_record.name != rrset.name {
            return Err(ParseError::MixedRrSet);
        }
        let sig = Rrsig::parse(&sig_record)?;

        Ok(ProofStep { rrset, sig })
    }
}

fn read_chunk<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    if *pos + 2 > buf.len() {
        return Err(ParseError::Truncated);
    }
    let len = u16::from_be_bytes([buf[*pos], buf[*pos + 1]]) as usize;
    *pos += 2;
    if *pos + len > buf.len() {
        return Err(ParseError::Truncated);
    }
    let chunk = &buf[*pos..*pos + len];
    *pos += len;
    Ok(chunk)
}
