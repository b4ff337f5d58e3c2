use std::collections::HashSet;

use crate::wire::Name;

/// Gate deciding which suffixes names may be claimed under. Checked before
/// any proof work is spent.
pub trait PublicSuffixPolicy: Send + Sync {
    fn is_public_suffix(&self, name: &Name) -> bool;
}

/// A suffix list in the public-suffix-list text format: one rule per line,
/// `//` comments, `!` exception rules, `*.` wildcard rules.
#[derive(Debug, Default)]
pub struct SuffixList {
    suffixes: HashSet<Name>,
    wildcards: HashSet<Name>,
    exceptions: HashSet<Name>,
}

impl SuffixList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules, skipping lines that are empty, comments, or malformed.
    /// Returns the number of rules loaded.
    pub fn load_rules(&mut self, content: &str) -> usize {
        let mut count = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let added = if let Some(rest) = line.strip_prefix('!') {
                Name::parse(rest)
                    .map(|name| self.exceptions.insert(name))
                    .is_ok()
            } else if let Some(rest) = line.strip_prefix("*.") {
                Name::parse(rest)
                    .map(|name| self.wildcards.insert(name))
                    .is_ok()
            } else {
                Name::parse(line)
                    .map(|name| self.suffixes.insert(name))
                    .is_ok()
            };
            if added {
                count += 1;
            }
        }
        count
    }

    pub fn from_rules(content: &str) -> Self {
        let mut list = Self::new();
        list.load_rules(content);
        list
    }

    pub fn insert(&mut self, suffix: Name) {
        self.suffixes.insert(suffix);
    }

    pub fn len(&self) -> usize {
        self.suffixes.len() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty() && self.wildcards.is_empty()
    }
}

impl PublicSuffixPolicy for SuffixList {
    fn is_public_suffix(&self, name: &Name) -> bool {
        if name.is_root() {
            return false;
        }
        if self.exceptions.contains(name) {
            return false;
        }
        self.suffixes.contains(name) || self.wildcards.contains(&name.parent())
    }
}
