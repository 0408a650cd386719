use crate::error::SettingsError;
use serde::{Deserialize, Serialize};

/// Buy `quantity` shares when the score reaches `min_score`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdRule {
    pub min_score: f64,
    pub quantity: u64,
}

impl ThresholdRule {
    pub const fn new(min_score: f64, quantity: u64) -> Self {
        Self {
            min_score,
            quantity,
        }
    }
}

/// Buy-side sizing rules, strictly descending by `min_score`.
///
/// Lookup is first-match, so the ordering is what gives the table its meaning.
/// Construction rejects tables that are not sorted rather than re-sorting them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            rules: vec![
                ThresholdRule::new(0.35, 10),
                ThresholdRule::new(0.25, 5),
                ThresholdRule::new(0.175, 2),
            ],
        }
    }
}

impl ThresholdTable {
    pub fn new(rules: Vec<ThresholdRule>) -> Result<Self, SettingsError> {
        for rule in &rules {
            if !rule.min_score.is_finite() {
                return Err(SettingsError::Invalid(format!(
                    "threshold min_score must be finite, got {}",
                    rule.min_score
                )));
            }
            if rule.quantity == 0 {
                return Err(SettingsError::Invalid(format!(
                    "threshold at {} has zero quantity",
                    rule.min_score
                )));
            }
        }

        if let Some(pair) = rules.windows(2).find(|w| w[0].min_score <= w[1].min_score) {
            return Err(SettingsError::Invalid(format!(
                "threshold rules must be strictly descending by min_score ({} listed before {})",
                pair[0].min_score, pair[1].min_score
            )));
        }

        Ok(Self { rules })
    }

    /// Shares to buy for `score`, or 0 when no rule matches
    pub fn quantity_for(&self, score: f64) -> u64 {
        self.rules
            .iter()
            .find(|rule| score >= rule.min_score)
            .map(|rule| rule.quantity)
            .unwrap_or(0)
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Smallest score that produces a buy
    pub fn lowest_min_score(&self) -> Option<f64> {
        self.rules.last().map(|rule| rule.min_score)
    }
}

impl<'de> Deserialize<'de> for ThresholdTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rules = Vec::<ThresholdRule>::deserialize(deserializer)?;
        ThresholdTable::new(rules).map_err(serde::de::Error::custom)
    }
}
