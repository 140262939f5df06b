use serde::{Deserialize, Serialize};

use crate::transposition_table::ReplacementPolicy;

/// Tunables shared by the search driver and the transposition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest iteration of iterative deepening, in plies.
    pub search_depth: i32,
    /// Slots per cache tier. Should be prime.
    pub hash_size: usize,
    pub replacement: ReplacementPolicy,
    /// When false the cache misses on every probe.
    pub use_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_depth: 4,
            hash_size: 251_611,
            replacement: ReplacementPolicy::TwoTier,
            use_cache: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn test_partial_config_uses_defaults() -> TestResult {
        let config: EngineConfig = serde_json::from_str(r#"{"search_depth": 6}"#)?;
        assert_eq!(
            config,
            EngineConfig {
                search_depth: 6,
                ..Default::default()
            }
        );
        Ok(())
    }

    #[test]
    fn test_round_trip() -> TestResult {
        let config = EngineConfig {
            replacement: ReplacementPolicy::AlwaysReplace,
            use_cache: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&config)?;
        assert!(json.contains("\"AlwaysReplace\""));
        assert_eq!(serde_json::from_str::<EngineConfig>(&json)?, config);
        Ok(())
    }
}
