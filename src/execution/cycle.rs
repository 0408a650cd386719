use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout, Instant};

use crate::api::{Broker, NewsSource};
use crate::config::Settings;
use crate::error::{TickerError, ORDER_SUBMISSION};
use crate::execution::{ExecutionAction, Executor, TickerState};
use crate::models::{
    OrderConfirmation, OrderIntent, PortfolioSnapshot, PositionSnapshot, WatchlistEntry,
};
use crate::risk::RiskBudget;
use crate::sentiment::{SentimentAggregator, SentimentModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    Live,
    /// Decide and log, but never call the broker's order endpoint
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Sold { quantity: u64 },
    Bought { quantity: u64, value: f64 },
    Skipped { reason: String },
    Rejected { reason: String },
    BudgetExhausted { reason: String },
    OrderFailed { error: String },
    Failed { error: String },
}

/// What happened during one pass over the watchlist
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub portfolio: PortfolioSnapshot,
    /// In watchlist order; tickers after a budget halt are absent
    pub outcomes: Vec<(String, TickerOutcome)>,
    pub total_invested: f64,
    pub max_total_investment: f64,
    pub halted: bool,
}

impl CycleReport {
    pub fn outcome(&self, symbol: &str) -> Option<&TickerOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, outcome)| outcome)
    }

    pub fn orders_placed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TickerOutcome::Sold { .. } | TickerOutcome::Bought { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TickerOutcome::Failed { .. } | TickerOutcome::OrderFailed { .. }))
            .count()
    }
}

/// Runs one trading cycle over the watchlist.
///
/// Tickers are processed strictly one after another so the budget's
/// admit-then-record sequence never interleaves.
pub struct CycleRunner<N, B, M> {
    news: N,
    broker: B,
    aggregator: SentimentAggregator<M>,
    executor: Executor,
    watchlist: Vec<WatchlistEntry>,
    headline_limit: usize,
    order_pause: Duration,
    call_timeout: Duration,
    mode: OrderMode,
}

impl<N, B, M> CycleRunner<N, B, M>
where
    N: NewsSource,
    B: Broker,
    M: SentimentModel,
{
    pub fn new(news: N, broker: B, model: M, settings: &Settings, mode: OrderMode) -> Self {
        Self {
            news,
            broker,
            aggregator: SentimentAggregator::new(model),
            executor: Executor::from_settings(&settings.strategy, settings.risk),
            watchlist: settings.watchlist.clone(),
            headline_limit: settings.news.headline_limit,
            order_pause: settings.cycle.order_pause(),
            call_timeout: settings.cycle.call_timeout(),
            mode,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn news(&self) -> &N {
        &self.news
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub async fn run(&self) -> anyhow::Result<CycleReport> {
        let started_at = Utc::now();
        tracing::info!("💹 [CYCLE] Started at {}", started_at.format("%H:%M:%S"));

        let portfolio = self
            .timed("account lookup", self.broker.get_account())
            .await
            .context("Failed to fetch account snapshot")?;

        let mut budget = RiskBudget::new(portfolio.total_value, self.executor.limits());
        tracing::info!(
            "Portfolio Value: ${:.2}, Cash: ${:.2}, Cycle budget: ${:.2}",
            portfolio.total_value,
            portfolio.cash_available,
            budget.max_total_investment()
        );

        let mut outcomes = Vec::with_capacity(self.watchlist.len());
        let mut last_submission = None;
        let mut halted = false;

        for entry in &self.watchlist {
            let result = self
                .process_ticker(entry, portfolio.total_value, &mut budget, &mut last_submission)
                .await;

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("  ✗ Error with {}: {}", entry.symbol, e);
                    TickerOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            let stop = matches!(outcome, TickerOutcome::BudgetExhausted { .. });
            outcomes.push((entry.symbol.clone(), outcome));

            if stop {
                halted = true;
                break;
            }
        }

        let report = CycleReport {
            started_at,
            portfolio,
            outcomes,
            total_invested: budget.total_invested(),
            max_total_investment: budget.max_total_investment(),
            halted,
        };
        log_cycle_summary(&report, self.watchlist.len());

        Ok(report)
    }

    async fn process_ticker(
        &self,
        entry: &WatchlistEntry,
        portfolio_value: f64,
        budget: &mut RiskBudget,
        last_submission: &mut Option<Instant>,
    ) -> Result<TickerOutcome, TickerError> {
        let headlines = self
            .timed(
                "news fetch",
                self.news.fetch_headlines(&entry.name, self.headline_limit),
            )
            .await?;
        let score = self.aggregator.score(&headlines);
        tracing::info!(
            symbol = %entry.symbol,
            headlines = headlines.len(),
            "{} Sentiment Score: {:.3}",
            entry.symbol,
            score
        );

        let price = self
            .timed("price lookup", self.broker.get_latest_price(&entry.symbol))
            .await?;
        let position = self
            .timed("position lookup", self.broker.get_position(&entry.symbol))
            .await?
            .unwrap_or_else(|| PositionSnapshot::flat(&entry.symbol, price));

        let ticker = TickerState {
            symbol: &entry.symbol,
            score,
            current_quantity: position.quantity,
            price,
        };
        let decision = self.executor.process_ticker(&ticker, portfolio_value, budget);
        tracing::info!("  Decision: {:?} - {}", decision.action, decision.reason);

        let outcome = match decision.action {
            ExecutionAction::Sell { quantity } => {
                let intent = OrderIntent::sell(&entry.symbol, quantity);
                match self.submit(&intent, last_submission).await {
                    Ok(_) => TickerOutcome::Sold { quantity },
                    Err(e) if e.may_have_filled() => return Err(e),
                    Err(TickerError::Order(e)) => {
                        tracing::error!("  ✗ Sell failed for {}: {}", entry.symbol, e);
                        TickerOutcome::OrderFailed {
                            error: e.to_string(),
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            ExecutionAction::Buy { quantity, value } => {
                let intent = OrderIntent::buy(&entry.symbol, quantity);
                match self.submit(&intent, last_submission).await {
                    Ok(_) => {
                        budget.record(value);
                        TickerOutcome::Bought { quantity, value }
                    }
                    Err(e) if e.may_have_filled() => {
                        // Fill status unknown, so count it against the budget
                        budget.record(value);
                        return Err(e);
                    }
                    Err(TickerError::Order(e)) => {
                        tracing::error!("  ✗ Order failed for {}: {}", entry.symbol, e);
                        TickerOutcome::OrderFailed {
                            error: e.to_string(),
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            ExecutionAction::Skip => TickerOutcome::Skipped {
                reason: decision.reason,
            },
            ExecutionAction::Reject => TickerOutcome::Rejected {
                reason: decision.reason,
            },
            ExecutionAction::Halt => TickerOutcome::BudgetExhausted {
                reason: decision.reason,
            },
        };

        Ok(outcome)
    }

    /// Place an order, keeping at least `order_pause` between submissions
    async fn submit(
        &self,
        intent: &OrderIntent,
        last_submission: &mut Option<Instant>,
    ) -> Result<Option<OrderConfirmation>, TickerError> {
        if self.mode == OrderMode::DryRun {
            tracing::info!(
                "  → [DRY RUN] Would {} {} shares of {}",
                intent.side,
                intent.quantity,
                intent.symbol
            );
            return Ok(None);
        }

        if let Some(previous) = *last_submission {
            let elapsed = previous.elapsed();
            if elapsed < self.order_pause {
                sleep(self.order_pause - elapsed).await;
            }
        }

        let result = self
            .timed(ORDER_SUBMISSION, self.broker.submit_order(intent))
            .await;
        *last_submission = Some(Instant::now());

        let confirmation = result?;
        tracing::info!(
            "  ✓ Placed {} order: {} shares of {} (order {}, {})",
            intent.side.to_string().to_uppercase(),
            intent.quantity,
            intent.symbol,
            confirmation.order_id,
            confirmation.status
        );

        Ok(Some(confirmation))
    }

    async fn timed<T, E, F>(&self, operation: &'static str, fut: F) -> Result<T, TickerError>
    where
        F: Future<Output = Result<T, E>>,
        TickerError: From<E>,
    {
        match timeout(self.call_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TickerError::Timeout {
                operation,
                timeout: self.call_timeout,
            }),
        }
    }
}

fn log_cycle_summary(report: &CycleReport, watchlist_len: usize) {
    tracing::info!("\n📊 Cycle Summary:");
    tracing::info!(
        "  Tickers processed: {}/{}{}",
        report.outcomes.len(),
        watchlist_len,
        if report.halted {
            " (stopped: investment limit reached)"
        } else {
            ""
        }
    );
    tracing::info!("  Orders placed: {}", report.orders_placed());
    tracing::info!("  Failures: {}", report.failures());
    tracing::info!(
        "  Invested this cycle: ${:.2} of ${:.2}",
        report.total_invested,
        report.max_total_investment
    );
}
