// TF-IDF bag-of-words vectorizer
//
// Lowercased tokens of at least two characters, an optional stop-word list,
// a frequency-capped vocabulary, smoothed inverse document frequencies and
// L2-normalized rows.
use std::collections::{HashMap, HashSet};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

pub const MAX_FEATURES: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub version: u32,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    stop_words: HashSet<String>,
    max_features: usize,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
}

impl TfidfVectorizer {
    pub fn new(stop_words: Vec<String>, max_features: usize) -> Self {
        Self {
            version: super::ARTIFACT_VERSION,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            stop_words: stop_words.into_iter().collect(),
            max_features,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn terms_of(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .filter(|t| !self.stop_words.contains(t))
            .collect()
    }

    /// Learn the vocabulary and idf weights from a corpus.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(LabelError::artifact("cannot fit vectorizer on an empty corpus"));
        }

        // Corpus-wide term counts and per-term document frequency
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        for doc in documents {
            let terms = self.terms_of(doc);
            let mut seen = HashSet::new();
            for term in terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        // Keep the most frequent terms, then assign columns alphabetically so
        // the layout is stable regardless of corpus order.
        let mut ranked: Vec<(&String, &u64)> = term_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let mut kept: Vec<String> = ranked
            .into_iter()
            .take(self.max_features)
            .map(|(term, _)| term.clone())
            .collect();
        kept.sort();

        let n_docs = documents.len() as f32;
        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        Ok(())
    }

    /// Map one document to an L2-normalized tf-idf row.
    pub fn transform(&self, text: &str) -> Array1<f32> {
        let mut row = Array1::<f32>::zeros(self.vocabulary.len());
        for term in self.terms_of(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                row[col] += 1.0;
            }
        }
        for (col, value) in row.iter_mut().enumerate() {
            *value *= self.idf[col];
        }
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
        row
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Array2<f32>> {
        self.fit(documents)?;
        let n_features = self.vocabulary.len();
        let mut matrix = Array2::<f32>::zeros((documents.len(), n_features));
        for (i, doc) in documents.iter().enumerate() {
            matrix.row_mut(i).assign(&self.transform(doc));
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn stop_words_never_enter_the_vocabulary() {
        let docs = corpus(&["envio para el destino norte", "el envio llega al destino"]);
        let mut vectorizer = TfidfVectorizer::new(vec!["el".into(), "al".into()], MAX_FEATURES);
        vectorizer.fit(&docs).unwrap();
        assert!(vectorizer.vocabulary.contains_key("envio"));
        assert!(!vectorizer.vocabulary.contains_key("el"));
        assert!(!vectorizer.vocabulary.contains_key("al"));
    }

    #[test]
    fn single_character_tokens_are_dropped() {
        let docs = corpus(&["a b cd ef"]);
        let mut vectorizer = TfidfVectorizer::new(Vec::new(), MAX_FEATURES);
        vectorizer.fit(&docs).unwrap();
        assert_eq!(vectorizer.vocabulary_len(), 2);
    }

    #[test]
    fn vocabulary_is_capped_by_frequency() {
        let docs = corpus(&["aa aa aa bb bb cc dd"]);
        let mut vectorizer = TfidfVectorizer::new(Vec::new(), 2);
        vectorizer.fit(&docs).unwrap();
        assert_eq!(vectorizer.vocabulary_len(), 2);
        assert!(vectorizer.vocabulary.contains_key("aa"));
        assert!(vectorizer.vocabulary.contains_key("bb"));
    }

    #[test]
    fn rows_are_l2_normalized() {
        let docs = corpus(&["guia envio sucursal", "guia guia retiro"]);
        let mut vectorizer = TfidfVectorizer::new(Vec::new(), MAX_FEATURES);
        let matrix = vectorizer.fit_transform(&docs).unwrap();
        for row in matrix.rows() {
            let norm = row.dot(&row).sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn unseen_terms_transform_to_zero() {
        let docs = corpus(&["guia envio"]);
        let mut vectorizer = TfidfVectorizer::new(Vec::new(), MAX_FEATURES);
        vectorizer.fit(&docs).unwrap();
        let row = vectorizer.transform("palabras totalmente nuevas");
        assert_eq!(row.sum(), 0.0);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let mut vectorizer = TfidfVectorizer::new(Vec::new(), MAX_FEATURES);
        assert!(matches!(
            vectorizer.fit(&[]),
            Err(LabelError::ArtifactLoad { .. })
        ));
    }
}
