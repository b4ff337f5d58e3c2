use parking_lot::RwLock;
use tracing::info;

use crate::wire::{Ds, Name};

/// A root-of-trust entry: a DS record pinned for a zone, optionally bounded
/// to a validity window so scheduled key rollovers can be staged ahead of
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pub name: Name,
    pub ds: Ds,
    /// Anchor is usable from this UNIX time on; `None` = since forever
    pub valid_from: Option<u64>,
    /// Anchor stops being usable at this UNIX time; `None` = never
    pub valid_until: Option<u64>,
}

impl TrustAnchor {
    pub fn new(name: Name, ds: Ds) -> Self {
        Self {
            name,
            ds,
            valid_from: None,
            valid_until: None,
        }
    }

    pub fn with_window(mut self, valid_from: Option<u64>, valid_until: Option<u64>) -> Self {
        self.valid_from = valid_from;
        self.valid_until = valid_until;
        self
    }

    /// Active within `[valid_from, valid_until)`
    pub fn active_at(&self, now: u64) -> bool {
        self.valid_from.is_none_or(|from| now >= from)
            && self.valid_until.is_none_or(|until| now < until)
    }
}

/// The configured set of trust anchors.
///
/// Mutation happens only through the privileged [`Self::rotate`] and
/// [`Self::add_anchor`] operations; the validation path can only read the
/// anchors active at a point in time.
pub struct TrustAnchorStore {
    anchors: RwLock<Vec<TrustAnchor>>,
}

/// IANA root DS set: KSK-2010 (key tag 19036) and KSK-2017 (key tag 20326),
/// both algorithm 8 (RSA/SHA-256), digest type 2 (SHA-256).
/// <https://data.iana.org/root-anchors/root-anchors.xml>
const ROOT_DS: [(u16, &str); 2] = [
    (
        19036,
        "49AAC11D7B6F6446702E54A1607371607A1A41855200FD2CE1CDDE32F24E8FB5",
    ),
    (
        20326,
        "E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D",
    ),
];

impl TrustAnchorStore {
    /// A store seeded with the published IANA root anchors.
    pub fn new() -> Self {
        let anchors = ROOT_DS
            .iter()
            .map(|(key_tag, digest)| {
                TrustAnchor::new(
                    Name::root(),
                    Ds {
                        key_tag: *key_tag,
                        algorithm: 8,
                        digest_type: 2,
                        digest: hex::decode(digest).expect("root anchor digest is valid hex"),
                    },
                )
            })
            .collect();
        Self {
            anchors: RwLock::new(anchors),
        }
    }

    /// A store with the given anchors only; test networks pin their own roots.
    pub fn with_anchors(anchors: Vec<TrustAnchor>) -> Self {
        Self {
            anchors: RwLock::new(anchors),
        }
    }

    /// Add an anchor. Privileged.
    pub fn add_anchor(&self, anchor: TrustAnchor) {
        info!(zone = %anchor.name, key_tag = anchor.ds.key_tag, "added trust anchor");
        self.anchors.write().push(anchor);
    }

    /// Replace the full anchor set. Privileged.
    pub fn rotate(&self, anchors: Vec<TrustAnchor>) {
        info!(count = anchors.len(), "rotated trust anchor set");
        *self.anchors.write() = anchors;
    }

    /// The DS records for `zone` that are active at `now`. This is the only
    /// operation the validation path touches.
    pub fn active_at(&self, zone: &Name, now: u64) -> Vec<Ds> {
        self.anchors
            .read()
            .iter()
            .filter(|anchor| anchor.name == *zone && anchor.active_at(now))
            .map(|anchor| anchor.ds.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.anchors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.read().is_empty()
    }
}

impl Default for TrustAnchorStore {
    fn default() -> Self {
        Self::new()
    }
}
