//! Typed views over the RDATA of the record types the proof chain interprets.

use super::enums::RecordType;
use super::name::Name;
use super::record::ResourceRecord;
use super::{ParseError, Result};

fn read_u8(data: &[u8], pos: &mut usize) -> Result<u8> {
    let b = *data.get(*pos).ok_or(ParseError::Truncated)?;
    *pos += 1;
    Ok(b)
}

fn read_u16(data: &[u8], pos: &mut usize) -> Result<u16> {
    if *pos + 2 > data.len() {
        return Err(ParseError::Truncated);
    }
    let v = u16::from_be_bytes([data[*pos], data[*pos + 1]]);
    *pos += 2;
    Ok(v)
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32> {
    if *pos + 4 > data.len() {
        return Err(ParseError::Truncated);
    }
    let v = u32::from_be_bytes([data[*pos], data[*pos + 1], data[*pos + 2], data[*pos + 3]]);
    *pos += 4;
    Ok(v)
}

fn expect_type(record: &ResourceRecord, rtype: RecordType) -> Result<()> {
    if record.rtype != rtype {
        return Err(ParseError::UnexpectedType(record.rtype.into()));
    }
    Ok(())
}

/// RRSIG RDATA (RFC 4034 §3.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rrsig {
    pub type_covered: RecordType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer_name: Name,
    pub signature: Vec<u8>,
}

impl Rrsig {
    pub fn parse(record: &ResourceRecord) -> Result<Self> {
        expect_type(record, RecordType::Rrsig)?;
        let data = &record.rdata;
        let mut pos = 0;
        let type_covered = read_u16(data, &mut pos)?.into();
        let algorithm = read_u8(data, &mut pos)?;
        let labels = read_u8(data, &mut pos)?;
        let original_ttl = read_u32(data, &mut pos)?;
        let expiration = read_u32(data, &mut pos)?;
        let inception = read_u32(data, &mut pos)?;
        let key_tag = read_u16(data, &mut pos)?;
        let signer_name = Name::parse_wire(data, &mut pos)?;
        let signature = data[pos..].to_vec();
        if signature.is_empty() {
            return Err(ParseError::MissingSignature);
        }
        Ok(Self {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            signature,
        })
    }

    /// The RDATA fields up to and excluding the signature, as covered by the
    /// signature itself.
    pub fn write_rdata_prefix(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&u16::from(self.type_covered).to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.expiration.to_be_bytes());
        out.extend_from_slice(&self.inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        self.signer_name.write_wire(out);
    }
}

/// DNSKEY RDATA (RFC 4034 §2.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

/// The ZONE bit; keys without it may not sign zone data.
const DNSKEY_FLAG_ZONE: u16 = 0x0100;

/// The protocol field is fixed at 3 for DNSSEC.
pub const DNSKEY_PROTOCOL_DNSSEC: u8 = 3;

impl Dnskey {
    pub fn parse(record: &ResourceRecord) -> Result<Self> {
        expect_type(record, RecordType::Dnskey)?;
        let data = &record.rdata;
        let mut pos = 0;
        let flags = read_u16(data, &mut pos)?;
        let protocol = read_u8(data, &mut pos)?;
        let algorithm = read_u8(data, &mut pos)?;
        Ok(Self {
            flags,
            protocol,
            algorithm,
            public_key: data[pos..].to_vec(),
        })
    }

    pub fn is_zone_key(&self) -> bool {
        self.flags & DNSKEY_FLAG_ZONE != 0
    }

    /// Re-encode the RDATA exactly as it appeared on the wire.
    pub fn write_rdata(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.push(self.protocol);
        out.push(self.algorithm);
        out.extend_from_slice(&self.public_key);
    }
}

/// DS RDATA (RFC 4034 §5.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl Ds {
    pub fn parse(record: &ResourceRecord) -> Result<Self> {
        expect_type(record, RecordType::Ds)?;
        Self::parse_rdata(&record.rdata)
    }

    pub fn parse_rdata(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let key_tag = read_u16(data, &mut pos)?;
        let algorithm = read_u8(data, &mut pos)?;
        let digest_type = read_u8(data, &mut pos)?;
        let digest = data[pos..].to_vec();
        if digest.is_empty() {
            return Err(ParseError::Truncated);
        }
        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }
}

/// NSEC3 RDATA (RFC 5155 §3.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nsec3 {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
    pub next_hashed_owner: Vec<u8>,
    pub type_bitmap: Vec<u8>,
}

impl Nsec3 {
    pub fn parse(record: &ResourceRecord) -> Result<Self> {
        expect_type(record, RecordType::Nsec3)?;
        let data = &record.rdata;
        let mut pos = 0;
        let hash_algorithm = read_u8(data, &mut pos)?;
        let flags = read_u8(data, &mut pos)?;
        let iterations = read_u16(data, &mut pos)?;
        let salt_len = read_u8(data, &mut pos)? as usize;
        if pos + salt_len > data.len() {
            return Err(ParseError::Truncated);
        }
        let salt = data[pos..pos + salt_len].to_vec();
        pos += salt_len;
        let hash_len = read_u8(data, &mut pos)? as usize;
        if hash_len == 0 || pos + hash_len > data.len() {
            return Err(ParseError::Truncated);
        }
        let next_hashed_owner = data[pos..pos + hash_len].to_vec();
        pos += hash_len;
        let type_bitmap = data[pos..].to_vec();
        Ok(Self {
            hash_algorithm,
            flags,
            iterations,
            salt,
            next_hashed_owner,
            type_bitmap,
        })
    }

    /// Whether the type bitmap (window-block format, RFC 4034 §4.1.2) claims
    /// a record of `rtype` at the owner name.
    pub fn bitmap_contains(&self, rtype: RecordType) -> bool {
        let wanted = u16::from(rtype);
        let (window, bit) = ((wanted >> 8) as u8, (wanted & 0xFF) as u8);
        let mut data = &self.type_bitmap[..];
        while data.len() >= 2 {
            let (win, len) = (data[0], data[1] as usize);
            data = &data[2..];
            if len == 0 || len > 32 || data.len() < len {
                return false;
            }
            if win == window {
                let (byte, mask) = ((bit / 8) as usize, 0x80u8 >> (bit % 8));
                return byte < len && data[byte] & mask != 0;
            }
            data = &data[len..];
        }
        false
    }
}

/// TXT RDATA: a sequence of length-prefixed character-strings (RFC 1035 §3.3.14)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Txt {
    pub segments: Vec<Vec<u8>>,
}

impl Txt {
    pub fn parse(record: &ResourceRecord) -> Result<Self> {
        expect_type(record, RecordType::Txt)?;
        let data = &record.rdata;
        let mut pos = 0;
        let mut segments = Vec::new();
        while pos < data.len() {
            let len = read_u8(data, &mut pos)? as usize;
            if pos + len > data.len() {
                return Err(ParseError::Truncated);
            }
            segments.push(data[pos..pos + len].to_vec());
            pos += len;
        }
        if segments.is_empty() {
            return Err(ParseError::Truncated);
        }
        Ok(Self { segments })
    }

    /// All character-strings of the record joined, the form the claim grammar
    /// is parsed from.
    pub fn joined(&self) -> Vec<u8> {
        self.segments.concat()
    }
}
