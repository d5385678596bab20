//! Term-weight lexicon model.
//!
//! File format:
//! `{ "weights": { "S": { "välfärd": 2.0 }, ... }, "smoothing": 0.5 }`

use crate::data::Party;
use crate::error::ModelError;
use crate::ml::{Likeness, LikenessModel};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct LexiconFile {
    weights: HashMap<Party, HashMap<String, f64>>,
    #[serde(default = "default_smoothing")]
    smoothing: f64,
}

fn default_smoothing() -> f64 {
    1.0
}

/// Sums per-party term weights over the tokens of the input text.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    weights: HashMap<Party, HashMap<String, f64>>,
    smoothing: f64,
}

impl LexiconModel {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::new(file.weights, file.smoothing)
    }

    pub fn new(
        weights: HashMap<Party, HashMap<String, f64>>,
        smoothing: f64,
    ) -> Result<Self, ModelError> {
        if let Some(party) = weights
            .keys()
            .find(|p| !Party::PARLIAMENTARY.contains(*p))
        {
            return Err(ModelError::InvalidModel(format!(
                "{party} is not a parliamentary party"
            )));
        }
        if weights.values().all(|terms| terms.is_empty()) {
            return Err(ModelError::InvalidModel("lexicon has no terms".into()));
        }
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(ModelError::InvalidModel(format!(
                "smoothing must be a non-negative number, got {smoothing}"
            )));
        }

        let weights = weights
            .into_iter()
            .map(|(party, terms)| {
                let terms = terms
                    .into_iter()
                    .map(|(term, w)| (term.to_lowercase(), w))
                    .collect();
                (party, terms)
            })
            .collect();
        Ok(Self { weights, smoothing })
    }

    pub fn term_count(&self) -> usize {
        self.weights.values().map(HashMap::len).sum()
    }
}

/// Lowercase runs of alphanumerics, keeping a leading `#` on hashtags.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '#'))
        .map(|t| t.trim_end_matches('#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl LikenessModel for LexiconModel {
    fn predict(&self, text: &str) -> Result<Likeness, ModelError> {
        let tokens = tokenize(text);
        Ok(Likeness::from_weights(|party| {
            let matched: f64 = self
                .weights
                .get(&party)
                .map(|terms| tokens.iter().filter_map(|t| terms.get(t)).sum::<f64>())
                .unwrap_or(0.0);
            self.smoothing + matched
        }))
    }
}
