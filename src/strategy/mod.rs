// Sentiment-to-order sizing rules
pub mod thresholds;

pub use thresholds::{ThresholdRule, ThresholdTable};

use serde::{Deserialize, Serialize};

/// Buy table plus the independent full-liquidation trigger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategySettings {
    pub buy_thresholds: ThresholdTable,
    pub sell_threshold: f64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            buy_thresholds: ThresholdTable::default(),
            sell_threshold: -0.175,
        }
    }
}

impl StrategySettings {
    /// True when some score would both liquidate a holding and buy more
    pub fn ranges_overlap(&self) -> bool {
        self.buy_thresholds
            .lowest_min_score()
            .is_some_and(|lowest| self.sell_threshold >= lowest)
    }
}
