// Headline sentiment scoring
pub mod vader;

pub use vader::VaderModel;

/// Scores a single piece of text.
pub trait SentimentModel: Send + Sync {
    /// Compound polarity in [-1, 1]
    fn compound_score(&self, text: &str) -> f64;
}

/// Reduces a batch of headlines to one score.
///
/// The result is the unweighted mean of the per-headline compound scores.
/// No recency decay and no de-duplication is applied. An empty batch is
/// neutral (exactly 0.0), not an error.
pub struct SentimentAggregator<M> {
    model: M,
}

impl<M: SentimentModel> SentimentAggregator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn score<S: AsRef<str>>(&self, headlines: &[S]) -> f64 {
        if headlines.is_empty() {
            return 0.0;
        }

        let total: f64 = headlines
            .iter()
            .map(|h| self.model.compound_score(h.as_ref()).clamp(-1.0, 1.0))
            .sum();

        total / headlines.len() as f64
    }
}
