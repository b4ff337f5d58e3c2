use super::enums::{RecordClass, RecordType};
use super::name::Name;
use super::rdata::Rrsig;
use super::{ParseError, Result};

/// A single decoded resource record.
///
/// Records exist only for the duration of one verification call; nothing in
/// the crate stores DNS content past that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Name,
    pub rtype: RecordType,
    pub class: RecordClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl ResourceRecord {
    /// Decode one record from wire format at `pos`, advancing `pos` past it.
    pub fn parse(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let name = Name::parse_wire(buf, pos)?;
        if *pos + 10 > buf.len() {
            return Err(ParseError::Truncated);
        }
        let rtype = u16::from_be_bytes([buf[*pos], buf[*pos + 1]]).into();
        let class = u16::from_be_bytes([buf[*pos + 2], buf[*pos + 3]]).into();
        let ttl = u32::from_be_bytes([buf[*pos + 4], buf[*pos + 5], buf[*pos + 6], buf[*pos + 7]]);
        let rdlength = u16::from_be_bytes([buf[*pos + 8], buf[*pos + 9]]) as usize;
        *pos += 10;
        if *pos + rdlength > buf.len() {
            return Err(ParseError::Truncated);
        }
        let rdata = buf[*pos..*pos + rdlength].to_vec();
        *pos += rdlength;
        Ok(Self {
            name,
            rtype,
            class,
            ttl,
            rdata,
        })
    }

    /// Append the wire encoding of this record. Inverse of [`Self::parse`].
    pub fn write(&self, out: &mut Vec<u8>) {
        self.name.write_wire(out);
        out.extend_from_slice(&u16::from(self.rtype).to_be_bytes());
        out.extend_from_slice(&u16::from(self.class).to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&(self.rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.rdata);
    }
}

/// A set of records sharing `(name, type, class)`.
///
/// Invariant, enforced at construction: at least one record, all keyed alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrSet {
    pub name: Name,
    pub rtype: RecordType,
    pub class: RecordClass,
    records: Vec<ResourceRecord>,
}

impl RrSet {
    pub fn from_records(records: Vec<ResourceRecord>) -> Result<Self> {
        let first = records.first().ok_or(ParseError::EmptyRrSet)?;
        let (name, rtype, class) = (first.name.clone(), first.rtype, first.class);
        for record in &records {
            if record.name != name || record.rtype != rtype || record.class != class {
                return Err(ParseError::MixedRrSet);
            }
        }
        Ok(Self {
            name,
            rtype,
            class,
            records,
        })
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Records in canonical order: sorted by RDATA byte order, duplicate
    /// RDATA dropped (RFC 4034 §6.3).
    pub fn canonical_order(&self) -> Vec<&ResourceRecord> {
        let mut ordered: Vec<&ResourceRecord> = self.records.iter().collect();
        ordered.sort_by(|a, b| a.rdata.cmp(&b.rdata));
        ordered.dedup_by(|a, b| a.rdata == b.rdata);
        ordered
    }

    /// The exact byte string the covering RRSIG signs (RFC 4034 §3.1.8.1):
    /// the RRSIG RDATA up to and excluding the signature, followed by every
    /// record in canonical order with the owner name canonicalized and the
    /// TTL replaced by the signature's original TTL.
    ///
    /// When the RRSIG's label count is lower than the owner name's, the
    /// records were synthesized from a wildcard and the signed owner name is
    /// rebuilt as `*.<suffix>` before encoding.
    pub fn signed_data(&self, sig: &Rrsig) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(512);
        sig.write_rdata_prefix(&mut out);

        let owner_labels = self.name.label_count();
        let sig_labels = sig.labels as usize;
        if sig_labels > owner_labels {
            return Err(ParseError::InvalidWildcard);
        }

        for record in self.canonical_order() {
            if sig_labels < owner_labels {
                out.extend_from_slice(b"\x01*");
                self.name.suffix(sig_labels).write_wire(&mut out);
            } else {
                record.name.write_wire(&mut out);
            }
            out.extend_from_slice(&u16::from(record.rtype).to_be_bytes());
            out.extend_from_slice(&u16::from(record.class).to_be_bytes());
            out.extend_from_slice(&sig.original_ttl.to_be_bytes());
            out.extend_from_slice(&(record.rdata.len() as u16).to_be_bytes());
            out.extend_from_slice(&record.rdata);
        }
        Ok(out)
    }
}
