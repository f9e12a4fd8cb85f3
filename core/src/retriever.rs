use crate::error::Result;
use crate::index::{IndexMeta, PersistedIndex};
use crate::persist::IndexStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of records returned by [`Retriever::query`].
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Row of the record in the indexed dataset.
    pub row: usize,
    pub score: f32,
    pub description: String,
}

/// Read-only handle over a loaded index.
pub struct Retriever {
    index: PersistedIndex,
}

impl Retriever {
    pub fn load(store: &dyn IndexStore) -> Result<Self> {
        let index = store.get()?;
        tracing::debug!(location = %store.location(), num_docs = index.meta.num_docs, "index loaded");
        Ok(Self { index })
    }

    pub fn from_index(index: PersistedIndex) -> Self {
        Self { index }
    }

    pub fn meta(&self) -> &IndexMeta { &self.index.meta }

    pub fn len(&self) -> usize { self.index.vectors.len() }

    pub fn is_empty(&self) -> bool { self.index.vectors.is_empty() }

    /// Descriptions of the [`DEFAULT_TOP_K`] records most similar to `summary`,
    /// best first.
    pub fn query(&self, summary: &str) -> Vec<String> {
        self.query_scored(summary, DEFAULT_TOP_K)
            .into_iter()
            .map(|r| r.description)
            .collect()
    }

    /// Rank every record by cosine similarity to `summary` and keep the first `k`.
    ///
    /// Equal scores keep ascending row order, so a query without any known
    /// term returns the first `k` rows.
    pub fn query_scored(&self, summary: &str, k: usize) -> Vec<ScoredRecord> {
        let q = self.index.vectorizer.transform(summary);
        // both sides are unit length (or zero), so the dot product is the cosine
        let mut scored: Vec<(usize, f32)> = self
            .index
            .vectors
            .iter()
            .enumerate()
            .map(|(row, v)| (row, q.dot(v)))
            .collect();
        scored.sort_by(|a, b| rank_order(*a, *b));
        tracing::debug!(query_terms = q.entries.len(), candidates = scored.len(), k, "ranked records");

        scored
            .into_iter()
            .take(k)
            .map(|(row, score)| ScoredRecord {
                row,
                score,
                description: self.index.dataset.records[row].description().to_string(),
            })
            .collect()
    }

    /// The top descriptions joined by a single space, ready to hand to the
    /// generation step. `None` when nothing was retrieved.
    pub fn relevant_context(&self, summary: &str) -> Option<String> {
        let results = self.query(summary);
        if results.is_empty() {
            None
        } else {
            Some(results.join(" "))
        }
    }
}

/// Score descending, then row ascending.
fn rank_order(a: (usize, f32), b: (usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_breaks_ties_by_row() {
        let mut v = vec![(2, 0.5), (0, 0.1), (1, 0.5), (3, 0.9)];
        v.sort_by(|a, b| rank_order(*a, *b));
        let rows: Vec<usize> = v.iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![3, 1, 2, 0]);
    }
}
