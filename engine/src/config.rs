use serde::{Deserialize, Serialize};

/// Engine limits and policy switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on exclusion list length.
    pub max_excluded_addresses: usize,
    /// Upper bound on dividend name length in bytes.
    pub max_name_length: usize,
    /// Treat any claimed amount as disqualifying in the shared claimability check.
    pub reject_partially_claimed: bool,
    /// Upper bound on holders visited by one ranged push.
    pub max_push_iterations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_excluded_addresses: dividend_checkpoint::EXCLUDED_ADDRESS_LIMIT as usize,
            max_name_length: dividend_checkpoint::MAX_NAME_LENGTH as usize,
            reject_partially_claimed: false,
            max_push_iterations: 100,
        }
    }
}
