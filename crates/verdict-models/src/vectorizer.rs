//! TF-IDF text vectorizer

use crate::preprocessor::Preprocessor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;
use verdict_core::{Error, Result};

/// Tokens are runs of at least two word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 3000;

/// Fitted TF-IDF vectorizer.
///
/// Columns follow alphabetical term order. Rows are raw term counts
/// weighted by smoothed IDF and L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfState", into = "TfidfState")]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    tokenizer: Regex,
}

/// On-disk form of [`TfidfVectorizer`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TfidfState {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TryFrom<TfidfState> for TfidfVectorizer {
    type Error = Error;

    fn try_from(state: TfidfState) -> Result<Self> {
        Self::from_parts(state.vocabulary, state.idf)
    }
}

impl From<TfidfVectorizer> for TfidfState {
    fn from(v: TfidfVectorizer) -> Self {
        Self {
            vocabulary: v.vocabulary,
            idf: v.idf,
        }
    }
}

fn tokenizer() -> Result<Regex> {
    Regex::new(TOKEN_PATTERN)
        .map_err(|e| Error::internal(format!("Failed to build token pattern: {}", e)))
}

impl TfidfVectorizer {
    /// Build a vectorizer from a vocabulary and matching IDF weights
    pub fn from_parts(vocabulary: BTreeMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(Error::artifact(format!(
                "vocabulary has {} terms but idf has {} weights",
                vocabulary.len(),
                idf.len()
            )));
        }

        let mut seen = vec![false; idf.len()];
        for (term, &index) in &vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::artifact(format!(
                        "term '{}' has invalid or duplicate column {}",
                        term, index
                    )))
                }
            }
        }

        Ok(Self {
            vocabulary,
            idf,
            tokenizer: tokenizer()?,
        })
    }

    /// Fit vocabulary and IDF weights on a corpus.
    ///
    /// With `max_features`, only the most frequent terms across the corpus
    /// are kept (ties broken alphabetically).
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: Option<usize>) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::training("cannot fit a vectorizer on an empty corpus"));
        }

        let tokenizer = tokenizer()?;
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let lowered = doc.as_ref().to_lowercase();
            let mut seen_in_doc: HashSet<&str> = HashSet::new();
            for m in tokenizer.find_iter(&lowered) {
                *term_counts.entry(m.as_str().to_string()).or_insert(0) += 1;
                seen_in_doc.insert(m.as_str());
            }
            for term in seen_in_doc {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(Error::training("corpus contains no tokens"));
        }

        let mut terms: Vec<(String, u64)> = term_counts.into_iter().collect();
        if let Some(limit) = max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            terms.truncate(limit);
        }

        let kept: BTreeMap<String, u64> = terms
            .into_iter()
            .map(|(term, _)| {
                let df = doc_freq.get(&term).copied().unwrap_or(0);
                (term, df)
            })
            .collect();

        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        debug!("Fitted TF-IDF vocabulary of {} terms on {} documents", idf.len(), documents.len());

        Ok(Self {
            vocabulary,
            idf,
            tokenizer,
        })
    }

    /// Term to column mapping
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// IDF weight per column
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Transform one document into an L2-normalized TF-IDF row
    pub fn transform_document(&self, document: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.idf.len()];
        let lowered = document.to_lowercase();

        for m in self.tokenizer.find_iter(&lowered) {
            if let Some(&index) = self.vocabulary.get(m.as_str()) {
                row[index] += 1.0;
            }
        }

        let mut norm = 0.0;
        for (value, weight) in row.iter_mut().zip(&self.idf) {
            *value *= weight;
            norm += *value * *value;
        }

        if norm > 0.0 {
            let norm = norm.sqrt();
            for value in &mut row {
                *value /= norm;
            }
        }

        row
    }
}

impl Preprocessor<str> for TfidfVectorizer {
    fn transform(&self, input: &str) -> Result<Vec<f64>> {
        Ok(self.transform_document(input))
    }

    fn n_features(&self) -> usize {
        self.idf.len()
    }
}
