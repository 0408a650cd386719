use super::{RiskLimits, RiskRejection};

/// Running total of capital committed during one cycle.
///
/// Created fresh at the start of every cycle and owned by the cycle runner.
/// `admit` is only advisory: the caller must `record` an admitted trade
/// before asking about the next one, which holds as long as tickers are
/// processed one at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBudget {
    total_invested: f64,
    max_total_investment: f64,
}

impl RiskBudget {
    pub fn new(portfolio_value: f64, limits: &RiskLimits) -> Self {
        Self::with_max(limits.max_total_investment(portfolio_value))
    }

    pub fn with_max(max_total_investment: f64) -> Self {
        Self {
            total_invested: 0.0,
            max_total_investment,
        }
    }

    pub fn admit(&self, proposed_value: f64) -> bool {
        self.total_invested + proposed_value <= self.max_total_investment
    }

    pub fn check(&self, proposed_value: f64) -> Result<(), RiskRejection> {
        if self.admit(proposed_value) {
            Ok(())
        } else {
            Err(RiskRejection::BudgetExhausted {
                remaining: self.remaining(),
                requested: proposed_value,
            })
        }
    }

    pub fn record(&mut self, value: f64) {
        self.total_invested += value;
    }

    pub fn total_invested(&self) -> f64 {
        self.total_invested
    }

    pub fn max_total_investment(&self) -> f64 {
        self.max_total_investment
    }

    pub fn remaining(&self) -> f64 {
        (self.max_total_investment - self.total_invested).max(0.0)
    }
}
