//! DCA ladder configuration

use serde::{Deserialize, Serialize};

/// DCA ladder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcaConfig {
    /// Adverse move (percent) for each level before multipliers
    pub base_percentages: Vec<f64>,
    /// Added per level beyond the base ladder (percent)
    pub extension_step_pct: f64,
    /// `k` in the volatility multiplier `1 + volatility * k`
    pub volatility_factor: f64,
    /// `k` used when optimization is enabled
    pub optimized_volatility_factor: f64,
    /// Linear amount growth per level
    pub linear_step: f64,
    /// Exponential amount growth per level in variable-amount mode
    pub exponential_base: f64,
    /// Support/resistance candidates must sit at least this far from entry (fraction)
    pub sr_min_distance: f64,
    /// ... and at most this far
    pub sr_max_distance: f64,
    /// Candidates closer than this to a kept level are dropped (fraction)
    pub sr_merge_distance: f64,
    /// Deepest allowed adverse move for a long ladder (fraction)
    pub max_long_depth: f64,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            base_percentages: vec![3.0, 7.0, 12.0, 18.0, 25.0],
            extension_step_pct: 8.0,
            volatility_factor: 5.0,
            optimized_volatility_factor: 10.0,
            linear_step: 0.5,
            exponential_base: 1.5,
            sr_min_distance: 0.01,
            sr_max_distance: 0.30,
            sr_merge_distance: 0.005,
            max_long_depth: 0.95,
        }
    }
}
