use serde::Deserialize;
use thiserror::Error;

use crate::dnssec::{MAX_NSEC3_ITERATIONS, TrustAnchor};
use crate::registrar::SuffixList;
use crate::wire::{Ds, Name};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(String),

    #[error("invalid anchor name {0:?}")]
    InvalidName(String),

    #[error("invalid anchor digest {0:?}")]
    InvalidDigest(String),
}

/// Registrar configuration.
///
/// The defaults are production values; test networks override the anchor set
/// and suffix rules to pin their own roots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Trust anchors seeding every chain validation
    pub anchors: Vec<AnchorConfig>,

    /// Public-suffix rules, one per line in PSL text format
    pub suffix_rules: String,

    /// Ceiling on NSEC3 iteration counts accepted in absence proofs
    pub max_nsec3_iterations: u16,
}

/// One trust anchor: a DS record in hex form plus an optional validity
/// window for staged key rollovers.
#[derive(Debug, Clone, Deserialize)]
pub struct AnchorConfig {
    pub name: String,
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    /// Hex-encoded digest
    pub digest: String,
    pub valid_from: Option<u64>,
    pub valid_until: Option<u64>,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            // IANA root KSK-2010 and KSK-2017
            anchors: vec![
                AnchorConfig {
                    name: ".".to_string(),
                    key_tag: 19036,
                    algorithm: 8,
                    digest_type: 2,
                    digest: "49AAC11D7B6F6446702E54A1607371607A1A41855200FD2CE1CDDE32F24E8FB5"
                        .to_string(),
                    valid_from: None,
                    valid_until: None,
                },
                AnchorConfig {
                    name: ".".to_string(),
                    key_tag: 20326,
                    algorithm: 8,
                    digest_type: 2,
                    digest: "E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D"
                        .to_string(),
                    valid_from: None,
                    valid_until: None,
                },
            ],
            suffix_rules: "com\nnet\norg\nxyz\n".to_string(),
            max_nsec3_iterations: MAX_NSEC3_ITERATIONS,
        }
    }
}

impl RegistrarConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Resolve the configured anchors into trust anchor entries.
    pub fn trust_anchors(&self) -> Result<Vec<TrustAnchor>, ConfigError> {
        self.anchors
            .iter()
            .map(|anchor| {
                let name = Name::parse(&anchor.name)
                    .map_err(|_| ConfigError::InvalidName(anchor.name.clone()))?;
                let digest = hex::decode(&anchor.digest)
                    .map_err(|_| ConfigError::InvalidDigest(anchor.digest.clone()))?;
                if digest.is_empty() {
                    return Err(ConfigError::InvalidDigest(anchor.digest.clone()));
                }
                Ok(TrustAnchor::new(
                    name,
                    Ds {
                        key_tag: anchor.key_tag,
                        algorithm: anchor.algorithm,
                        digest_type: anchor.digest_type,
                        digest,
                    },
                )
                .with_window(anchor.valid_from, anchor.valid_until))
            })
            .collect()
    }

    pub fn suffix_list(&self) -> SuffixList {
        SuffixList::from_rules(&self.suffix_rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::PublicSuffixPolicy;

    #[test]
    fn defaults_carry_root_anchors() {
        let config = RegistrarConfig::default();
        let anchors = config.trust_anchors().unwrap();
        assert_eq!(anchors.len(), 2);
        assert!(anchors.iter().all(|a| a.name == Name::root()));
        assert!(anchors.iter().any(|a| a.ds.key_tag == 20326));
        assert_eq!(anchors[0].ds.digest.len(), 32);
        assert!(!config.suffix_list().is_empty());
    }

    #[test]
    fn parses_from_toml() {
        let config = RegistrarConfig::from_toml_str(
            r#"
suffix_rules = "test\n"
max_nsec3_iterations = 150

[[anchors]]
name = "."
key_tag = 47005
algorithm = 13
digest_type = 2
digest = "2eb6e9f2480126691594d649a5a613de3052e37861634641bb568746f2ffc4d4"
valid_until = 1800000000
"#,
        )
        .unwrap();
        assert_eq!(config.max_nsec3_iterations, 150);
        let anchors = config.trust_anchors().unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].ds.key_tag, 47005);
        assert_eq!(anchors[0].valid_until, Some(1_800_000_000));
        assert!(config
            .suffix_list()
            .is_public_suffix(&Name::parse("test").unwrap()));
    }

    #[test]
    fn rejects_bad_digest() {
        let mut config = RegistrarConfig::default();
        config.anchors[0].digest = "zz".to_string();
        assert!(matches!(
            config.trust_anchors(),
            Err(ConfigError::InvalidDigest(_))
        ));
    }
}
