use std::fmt;

use sha3::{Digest, Keccak256};

use crate::wire::Name;

/// 256-bit registry node identifier, derived from a name by the recursive
/// namehash construction (EIP-137): the root is all zeroes, and each label
/// folds in as `keccak256(parent ‖ keccak256(label))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    pub const ROOT: NodeId = NodeId([0; 32]);

    pub fn namehash(name: &Name) -> NodeId {
        let mut node = [0u8; 32];
        for label in name.labels().iter().rev() {
            let label_hash = Keccak256::digest(label.as_bytes());
            let mut hasher = Keccak256::new();
            hasher.update(node);
            hasher.update(label_hash);
            node.copy_from_slice(&hasher.finalize());
        }
        NodeId(node)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A 20-byte owner address, the registry's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    /// Parse `0x`-prefixed, 40-hex-digit form.
    pub fn parse(s: &str) -> Option<Address> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
        if digits.len() != 40 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Some(Address(out))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
