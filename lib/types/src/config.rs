#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// How strictly LEB128 integers are read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum LebPolicy {
    /// Accept padded encodings as long as they fit the byte budget.
    #[default]
    Permissive,
    /// Reject any encoding longer than the minimal one.
    Strict,
}

/// Controls how strictly a module is decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    /// LEB128 canonicality policy.
    pub leb_policy: LebPolicy,
    /// Reject `else` outside of an `if` block.
    pub strict_nesting: bool,
    /// The most locals a single function body may declare.
    pub max_locals: usize,
}

impl DecoderConfig {
    /// The default cap on locals per function.
    pub const DEFAULT_MAX_LOCALS: usize = 50_000;

    /// Create a new configuration with the permissive defaults.
    pub fn new() -> Self {
        Self {
            leb_policy: LebPolicy::Permissive,
            strict_nesting: false,
            max_locals: Self::DEFAULT_MAX_LOCALS,
        }
    }

    /// Create a configuration with every strictness check enabled.
    pub fn strict() -> Self {
        Self {
            leb_policy: LebPolicy::Strict,
            strict_nesting: true,
            ..Self::new()
        }
    }

    /// Configures how LEB128 integers are read.
    ///
    /// This is [`LebPolicy::Permissive`] by default.
    pub fn leb_policy(&mut self, policy: LebPolicy) -> &mut Self {
        self.leb_policy = policy;
        self
    }

    /// Configures whether `else` must appear exactly once, directly inside
    /// an `if` block.
    ///
    /// This is `false` by default.
    pub fn strict_nesting(&mut self, enable: bool) -> &mut Self {
        self.strict_nesting = enable;
        self
    }

    /// Configures the most locals one function body may declare.
    pub fn max_locals(&mut self, limit: usize) -> &mut Self {
        self.max_locals = limit;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_config {
    use super::*;

    #[test]
    fn default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.leb_policy, LebPolicy::Permissive);
        assert!(!config.strict_nesting);
        assert_eq!(config.max_locals, 50_000);
    }

    #[test]
    fn setters_chain() {
        let mut config = DecoderConfig::new();
        config.strict_nesting(true).max_locals(8);
        assert!(config.strict_nesting);
        assert_eq!(config.max_locals, 8);
        assert_eq!(config.leb_policy, LebPolicy::Permissive);

        let strict = DecoderConfig::strict();
        assert_eq!(strict.leb_policy, LebPolicy::Strict);
        assert_eq!(strict.max_locals, DecoderConfig::DEFAULT_MAX_LOCALS);
    }
}
