use crate::models::OrderIntent;
use crate::risk::{RiskBudget, RiskLimits, RiskRejection};
use crate::strategy::{StrategySettings, ThresholdTable};

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionAction {
    /// Liquidate the whole holding
    Sell { quantity: u64 },
    /// Buy admitted by both risk checks; `value` must be recorded once filled
    Buy { quantity: u64, value: f64 },
    /// Sentiment too weak to act on
    Skip,
    /// Single-position cap would be exceeded
    Reject,
    /// Cycle budget exhausted, stop processing further tickers
    Halt,
}

#[derive(Debug, Clone)]
pub struct ExecutionDecision {
    pub action: ExecutionAction,
    pub reason: String,
}

impl ExecutionDecision {
    fn new(action: ExecutionAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }

    pub fn order_intent(&self, symbol: &str) -> Option<OrderIntent> {
        match self.action {
            ExecutionAction::Sell { quantity } => Some(OrderIntent::sell(symbol, quantity)),
            ExecutionAction::Buy { quantity, .. } => Some(OrderIntent::buy(symbol, quantity)),
            _ => None,
        }
    }
}

/// Everything known about one ticker at decision time
#[derive(Debug, Clone, Copy)]
pub struct TickerState<'a> {
    pub symbol: &'a str,
    pub score: f64,
    pub current_quantity: u64,
    pub price: f64,
}

/// Turns a sentiment score into at most one order for a ticker.
///
/// Rules are applied in fixed precedence: liquidation first, then buy sizing,
/// then the single-position cap, then the cycle budget.
pub struct Executor {
    buy_thresholds: ThresholdTable,
    sell_threshold: f64,
    limits: RiskLimits,
}

impl Executor {
    pub fn new(buy_thresholds: ThresholdTable, sell_threshold: f64, limits: RiskLimits) -> Self {
        Self {
            buy_thresholds,
            sell_threshold,
            limits,
        }
    }

    pub fn from_settings(strategy: &StrategySettings, limits: RiskLimits) -> Self {
        Self::new(
            strategy.buy_thresholds.clone(),
            strategy.sell_threshold,
            limits,
        )
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Decide what to do with one ticker.
    ///
    /// `portfolio_value` is the cycle-start snapshot value. The budget is only
    /// consulted here; recording an admitted buy is the caller's job.
    pub fn process_ticker(
        &self,
        ticker: &TickerState<'_>,
        portfolio_value: f64,
        budget: &RiskBudget,
    ) -> ExecutionDecision {
        // Check 1: Negative sentiment on an existing holding sells everything
        if ticker.score <= self.sell_threshold && ticker.current_quantity > 0 {
            return ExecutionDecision::new(
                ExecutionAction::Sell {
                    quantity: ticker.current_quantity,
                },
                format!(
                    "Sentiment {:.3} at or below sell threshold {:.3}",
                    ticker.score, self.sell_threshold
                ),
            );
        }

        // Check 2: Size the buy from the threshold table
        let quantity = self.buy_thresholds.quantity_for(ticker.score);
        if quantity == 0 {
            return ExecutionDecision::new(
                ExecutionAction::Skip,
                format!("Sentiment {:.3} not strong enough to buy", ticker.score),
            );
        }

        let position_value = ticker.current_quantity as f64 * ticker.price;
        let proposed_value = quantity as f64 * ticker.price;

        // Check 3: Single-position cap
        if let Err(RiskRejection::PositionCap { limit, requested }) =
            self.limits
                .check_position(portfolio_value, position_value, proposed_value)
        {
            return ExecutionDecision::new(
                ExecutionAction::Reject,
                format!(
                    "Position would reach ${:.2}, exceeds max allocation ${:.2}",
                    requested, limit
                ),
            );
        }

        // Check 4: Cycle-wide budget
        if let Err(RiskRejection::BudgetExhausted {
            remaining,
            requested,
        }) = budget.check(proposed_value)
        {
            return ExecutionDecision::new(
                ExecutionAction::Halt,
                format!(
                    "Total portfolio investment limit reached (${:.2} requested, ${:.2} remaining)",
                    requested, remaining
                ),
            );
        }

        ExecutionDecision::new(
            ExecutionAction::Buy {
                quantity,
                value: proposed_value,
            },
            format!(
                "Sentiment {:.3} buys {} shares (${:.2})",
                ticker.score, quantity, proposed_value
            ),
        )
    }
}
