use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::node::{Address, NodeId};

/// The external name registry the orchestrator writes into.
///
/// This is the orchestrator's only side effect on success; an unset node
/// reads as the zero address, mirroring the registry's own semantics.
pub trait NameRegistry: Send + Sync {
    fn set_owner(&self, node: NodeId, owner: Address);

    fn owner(&self, node: NodeId) -> Address;
}

/// In-memory registry for tests and embedded use.
#[derive(Default)]
pub struct InMemoryRegistry {
    owners: RwLock<HashMap<NodeId, Address>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameRegistry for InMemoryRegistry {
    fn set_owner(&self, node: NodeId, owner: Address) {
        debug!(%node, %owner, "registry owner updated");
        self.owners.write().insert(node, owner);
    }

    fn owner(&self, node: NodeId) -> Address {
        self.owners
            .read()
            .get(&node)
            .copied()
            .unwrap_or(Address::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_node_reads_zero() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.owner(NodeId::ROOT), Address::ZERO);

        let addr = Address([0x11; 20]);
        registry.set_owner(NodeId::ROOT, addr);
        assert_eq!(registry.owner(NodeId::ROOT), addr);
    }
}
