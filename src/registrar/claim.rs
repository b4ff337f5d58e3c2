use crate::wire::{RrSet, Txt};

use super::node::Address;

/// The label under which ownership claims are published: the TXT record for
/// `name` lives at `_ens.<name>`.
pub const CLAIM_LABEL: &str = "_ens";

/// Parser for the application-specific TXT claim grammar.
///
/// The grammar is deliberately pluggable: deployments that publish claims in
/// a different shape swap the parser without touching proof validation.
pub trait OwnerRecordParser: Send + Sync {
    /// Extract the claimed owner from one TXT record, or `None` if the
    /// record does not carry a claim.
    fn parse_owner(&self, txt: &Txt) -> Option<Address>;
}

/// The default grammar: the record's character-strings joined must read
/// `a=0x` followed by 40 hex digits.
#[derive(Debug, Default)]
pub struct AddressRecordParser;

impl OwnerRecordParser for AddressRecordParser {
    fn parse_owner(&self, txt: &Txt) -> Option<Address> {
        let joined = txt.joined();
        let text = std::str::from_utf8(&joined).ok()?;
        let value = text.strip_prefix("a=")?;
        Address::parse(value.trim())
    }
}

/// Scan a validated TXT RRSet in canonical order and return the first
/// parseable owner claim.
pub fn extract_owner(rrset: &RrSet, parser: &dyn OwnerRecordParser) -> Option<Address> {
    for record in rrset.canonical_order() {
        let Ok(txt) = Txt::parse(record) else {
            continue;
        };
        if let Some(owner) = parser.parse_owner(&txt) {
            return Some(owner);
        }
    }
    None
}
