use crate::dataset::Dataset;
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};

pub type TermId = u32;

/// Bumped whenever the layout of [`PersistedIndex`] changes.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Term-weight vector with entries sorted by term id. Zero weights are not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    /// Build from unordered entries; sorts by term id.
    pub fn from_entries(mut entries: Vec<(TermId, f32)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(t, _)| *t);
        Self { entries }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit length. The zero vector stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 { return; }
        for (_, w) in self.entries.iter_mut() {
            *w /= norm;
        }
    }

    /// Dot product via a merge over both sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
}

/// Everything a query needs: the fitted model, one vector per record, and the
/// records themselves. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedIndex {
    pub meta: IndexMeta,
    pub vectorizer: TfidfVectorizer,
    pub vectors: Vec<SparseVector>,
    pub dataset: Dataset,
}

impl PersistedIndex {
    /// Checks the layout invariants of a decoded index. Returns the reason on failure.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.meta.version != INDEX_FORMAT_VERSION {
            return Err(format!(
                "unsupported index version {} (expected {INDEX_FORMAT_VERSION})",
                self.meta.version
            ));
        }
        if self.vectors.len() != self.dataset.records.len() {
            return Err(format!(
                "{} vectors for {} records",
                self.vectors.len(),
                self.dataset.records.len()
            ));
        }
        if self.meta.num_docs as usize != self.vectors.len() {
            return Err(format!("meta reports {} docs, found {}", self.meta.num_docs, self.vectors.len()));
        }
        Ok(())
    }
}
