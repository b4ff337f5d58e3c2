use std::fmt;

use super::{ParseError, Result};

/// Maximum total length of a domain name in wire form (RFC 1035)
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a single label
pub const MAX_LABEL_LEN: usize = 63;

/// A fully-qualified domain name in canonical form.
///
/// Labels are lower-cased on construction (RFC 4034 §6.2), so equality and
/// hashing are already canonical. The root name has zero labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    /// The root name "."
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Parse a name from presentation format ("example.com", trailing dot optional)
    pub fn parse(s: &str) -> Result<Self> {
        if s == "." || s.is_empty() {
            return Ok(Self::root());
        }
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        let mut labels = Vec::new();
        for label in trimmed.split('.') {
            labels.push(check_label(label.as_bytes())?);
        }
        let name = Self { labels };
        if name.wire_len() > MAX_NAME_LEN {
            return Err(ParseError::NameTooLong);
        }
        Ok(name)
    }

    /// Decode a name from DNS wire format, advancing `pos`.
    ///
    /// Compression pointers are rejected: proof submissions must carry
    /// pre-expanded names.
    pub fn parse_wire(buf: &[u8], pos: &mut usize) -> Result<Self> {
        let mut labels = Vec::new();
        let mut wire_len = 1usize;
        loop {
            let len = *buf.get(*pos).ok_or(ParseError::Truncated)? as usize;
            *pos += 1;
            if len == 0 {
                break;
            }
            if len & 0xC0 == 0xC0 {
                return Err(ParseError::CompressedName);
            }
            if len > MAX_LABEL_LEN {
                return Err(ParseError::InvalidLabelLength(len as u8));
            }
            if *pos + len > buf.len() {
                return Err(ParseError::Truncated);
            }
            labels.push(check_label(&buf[*pos..*pos + len])?);
            *pos += len;
            wire_len += 1 + len;
            if wire_len > MAX_NAME_LEN {
                return Err(ParseError::NameTooLong);
            }
        }
        Ok(Self { labels })
    }

    /// Append the canonical (lower-cased, uncompressed) wire encoding
    pub fn write_wire(&self, out: &mut Vec<u8>) {
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
    }

    /// Length of the wire encoding in octets
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Number of labels, excluding the root
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// True if `self` is an ancestor of `other` or equal to it.
    ///
    /// The root is an ancestor of every name.
    pub fn is_ancestor_or_equal(&self, other: &Name) -> bool {
        if self.labels.len() > other.labels.len() {
            return false;
        }
        let skip = other.labels.len() - self.labels.len();
        other.labels[skip..] == self.labels[..]
    }

    /// The name with the leftmost label removed; the root's parent is the root.
    pub fn parent(&self) -> Name {
        Name {
            labels: self.labels.iter().skip(1).cloned().collect(),
        }
    }

    /// The rightmost `count` labels of this name.
    ///
    /// `suffix(0)` is the root. Panics if `count` exceeds the label count.
    pub fn suffix(&self, count: usize) -> Name {
        assert!(count <= self.labels.len());
        Name {
            labels: self.labels[self.labels.len() - count..].to_vec(),
        }
    }

    /// The name obtained by prepending `label` to `parent`.
    pub fn prefixed(label: &str, parent: &Name) -> Result<Name> {
        let mut labels = Vec::with_capacity(parent.labels.len() + 1);
        labels.push(check_label(label.as_bytes())?);
        labels.extend(parent.labels.iter().cloned());
        let name = Name { labels };
        if name.wire_len() > MAX_NAME_LEN {
            return Err(ParseError::NameTooLong);
        }
        Ok(name)
    }
}

fn check_label(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(ParseError::InvalidLabel);
    }
    if bytes.len() > MAX_LABEL_LEN {
        return Err(ParseError::InvalidLabelLength(bytes.len() as u8));
    }
    if !bytes.iter().all(|b| b.is_ascii_graphic()) {
        return Err(ParseError::InvalidLabel);
    }
    let mut label = String::with_capacity(bytes.len());
    for b in bytes {
        label.push(b.to_ascii_lowercase() as char);
    }
    Ok(label)
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}
