use super::SentimentModel;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER compound polarity.
///
/// Uses the full VADER lexicon and rule set (negation, intensifiers,
/// ALL-CAPS emphasis, "but" clauses, "kind of", punctuation). The buy and sell
/// thresholds are calibrated against this scale.
pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl VaderModel {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl SentimentModel for VaderModel {
    fn compound_score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .filter(|score| score.is_finite())
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}
