//! Party likeness inference.
//!
//! A model maps free text to a score per parliamentary party; the scores
//! are percentages and sum to 100.

mod lexicon;

pub use lexicon::LexiconModel;

use crate::data::Party;
use crate::error::ModelError;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Score per parliamentary party, in dashboard order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Likeness {
    scores: Vec<(Party, f64)>,
}

impl Likeness {
    /// Normalise raw non-negative weights to percentages. All-zero weights
    /// give the uniform distribution.
    pub fn from_weights(weights: impl Fn(Party) -> f64) -> Self {
        let raw: Vec<(Party, f64)> = Party::PARLIAMENTARY
            .iter()
            .map(|&p| (p, weights(p).max(0.0)))
            .collect();
        let total: f64 = raw.iter().map(|(_, w)| w).sum();

        let scores = if total > 0.0 && total.is_finite() {
            raw.into_iter().map(|(p, w)| (p, w / total * 100.0)).collect()
        } else {
            let share = 100.0 / Party::PARLIAMENTARY.len() as f64;
            raw.into_iter().map(|(p, _)| (p, share)).collect()
        };
        Self { scores }
    }

    pub fn uniform() -> Self {
        Self::from_weights(|_| 1.0)
    }

    pub fn scores(&self) -> &[(Party, f64)] {
        &self.scores
    }

    pub fn score(&self, party: Party) -> Option<f64> {
        self.scores
            .iter()
            .find(|(p, _)| *p == party)
            .map(|(_, s)| *s)
    }

    /// Party with the highest score; the earlier party wins a tie.
    pub fn most_alike(&self) -> Option<Party> {
        self.scores
            .iter()
            .fold(None, |best: Option<(Party, f64)>, &(p, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((p, s)),
            })
            .map(|(p, _)| p)
    }
}

/// Opaque text-to-likeness predictor.
pub trait LikenessModel: Send + Sync {
    fn predict(&self, text: &str) -> Result<Likeness, ModelError>;
}

/// Flat distribution shown before any prediction has been made.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformBaseline;

impl LikenessModel for UniformBaseline {
    fn predict(&self, _text: &str) -> Result<Likeness, ModelError> {
        Ok(Likeness::uniform())
    }
}

/// Load the lexicon model at `path`, or the baseline when no path is configured.
pub fn load_model(path: Option<&Path>) -> Result<Box<dyn LikenessModel>, ModelError> {
    match path {
        Some(path) => {
            let model = LexiconModel::from_file(path)?;
            info!(path = %path.display(), terms = model.term_count(), "loaded lexicon model");
            Ok(Box::new(model))
        }
        None => {
            warn!("no lexicon model configured, predicting the uniform baseline");
            Ok(Box::new(UniformBaseline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(likeness: &Likeness) -> f64 {
        likeness.scores().iter().map(|(_, s)| s).sum()
    }

    #[test]
    fn baseline_is_flat() {
        let likeness = UniformBaseline.predict("Sverige").unwrap();
        assert_eq!(likeness.scores().len(), 8);
        assert!((total(&likeness) - 100.0).abs() < 1e-9);
        assert_eq!(likeness.score(Party::SD), Some(12.5));
        assert_eq!(likeness.score(Party::FI), None);
    }

    #[test]
    fn weights_are_normalised() {
        let likeness = Likeness::from_weights(|p| match p {
            Party::S => 3.0,
            Party::M => 1.0,
            Party::V => -5.0,
            _ => 0.0,
        });
        assert!((total(&likeness) - 100.0).abs() < 1e-9);
        assert_eq!(likeness.score(Party::S), Some(75.0));
        assert_eq!(likeness.score(Party::V), Some(0.0));
        assert_eq!(likeness.most_alike(), Some(Party::S));
    }

    #[test]
    fn ties_go_to_dashboard_order() {
        assert_eq!(Likeness::uniform().most_alike(), Some(Party::M));
    }

    #[test]
    fn no_path_means_baseline() {
        let model = load_model(None).unwrap();
        assert_eq!(model.predict("").unwrap(), Likeness::uniform());
    }
}
