//! TF-IDF term-weight model.
//!
//! The vocabulary and document frequencies are fixed at fit time; later text
//! is projected into the same space and unknown terms are ignored.

use crate::index::{SparseVector, TermId};
use crate::tokenizer::{tokenize, AnalyzerConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub analyzer: AnalyzerConfig,
    /// Use smoothed IDF = ln((1 + N) / (1 + df)) + 1 instead of ln(N / df) + 1
    pub smooth_idf: bool,
    /// Use tf = 1 + ln(count) instead of the raw count
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self { analyzer: AnalyzerConfig::default(), smooth_idf: true, sublinear_tf: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub config: VectorizerConfig,
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub idf: Vec<f32>,
    pub num_docs: u32,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from the corpus. Term ids follow
    /// lexicographic term order.
    pub fn fit<S: AsRef<str>>(corpus: &[S], config: VectorizerConfig) -> Self {
        let analysed: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(d.as_ref(), &config.analyzer)).collect();
        Self::fit_analysed(&analysed, config)
    }

    /// Fit and return the corpus vectors in the same pass over the analysed text.
    pub fn fit_transform<S: AsRef<str>>(corpus: &[S], config: VectorizerConfig) -> (Self, Vec<SparseVector>) {
        let analysed: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(d.as_ref(), &config.analyzer)).collect();
        let model = Self::fit_analysed(&analysed, config);
        let vectors = analysed.iter().map(|terms| model.weigh(terms)).collect();
        (model, vectors)
    }

    fn fit_analysed(analysed: &[Vec<String>], config: VectorizerConfig) -> Self {
        let vocab: BTreeSet<&str> = analysed.iter().flatten().map(String::as_str).collect();
        let dictionary: HashMap<String, TermId> = vocab
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as TermId))
            .collect();

        let mut df = vec![0u32; dictionary.len()];
        for terms in analysed {
            let seen_in_doc: HashSet<TermId> = terms.iter().filter_map(|t| dictionary.get(t).copied()).collect();
            for tid in seen_in_doc {
                df[tid as usize] += 1;
            }
        }

        let n = analysed.len() as f32;
        let idf = df
            .iter()
            .map(|&df_t| {
                let df_t = df_t as f32;
                if config.smooth_idf {
                    ((1.0 + n) / (1.0 + df_t)).ln() + 1.0
                } else {
                    (n / df_t.max(1.0)).ln() + 1.0
                }
            })
            .collect();

        Self { config, dictionary, df, idf, num_docs: analysed.len() as u32 }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Project text into the model's space. Unknown terms contribute nothing;
    /// text without known terms yields the zero vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text, &self.config.analyzer))
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut tf_raw: HashMap<TermId, u32> = HashMap::new();
        for term in terms {
            if let Some(&tid) = self.dictionary.get(term) {
                *tf_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let entries = tf_raw
            .into_iter()
            .map(|(tid, count)| {
                let tf = if self.config.sublinear_tf { 1.0 + (count as f32).ln() } else { count as f32 };
                (tid, tf * self.idf[tid as usize])
            })
            .collect();
        let mut v = SparseVector::from_entries(entries);
        v.normalize();
        v
    }
}
