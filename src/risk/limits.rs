use serde::{Deserialize, Serialize};

/// Exposure caps, expressed as fractions of cycle-start portfolio value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskLimits {
    pub max_position_pct: f64,
    pub max_total_investment_pct: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_pct: 0.10,         // 10% of portfolio in any one symbol
            max_total_investment_pct: 0.80, // 80% of portfolio across one cycle
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskRejection {
    PositionCap { limit: f64, requested: f64 },
    BudgetExhausted { remaining: f64, requested: f64 },
}

impl RiskLimits {
    pub fn max_position_value(&self, portfolio_value: f64) -> f64 {
        portfolio_value * self.max_position_pct
    }

    pub fn max_total_investment(&self, portfolio_value: f64) -> f64 {
        portfolio_value * self.max_total_investment_pct
    }

    /// Single-position cap against the cycle-start portfolio value.
    ///
    /// Cash spent earlier in the same cycle is not subtracted from
    /// `portfolio_value`.
    pub fn check_position(
        &self,
        portfolio_value: f64,
        position_value: f64,
        proposed_value: f64,
    ) -> Result<(), RiskRejection> {
        let limit = self.max_position_value(portfolio_value);
        let requested = position_value + proposed_value;

        if requested > limit {
            return Err(RiskRejection::PositionCap { limit, requested });
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("max_position_pct", self.max_position_pct),
            ("max_total_investment_pct", self.max_total_investment_pct),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(format!("{} must be in (0, 1], got {}", name, value));
            }
        }
        Ok(())
    }
}
