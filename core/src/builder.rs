use crate::dataset::{Dataset, DESCRIPTION_COLUMN};
use crate::error::Result;
use crate::index::{IndexMeta, PersistedIndex, INDEX_FORMAT_VERSION};
use crate::persist::IndexStore;
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

/// Fits a term-weight model over a dataset's descriptions and replaces the
/// stored index with the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexBuilder {
    config: VectorizerConfig,
}

impl IndexBuilder {
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VectorizerConfig { &self.config }

    /// Read a CSV file, index it, and overwrite the store.
    pub fn build<P: AsRef<Path>>(&self, dataset_path: P, store: &dyn IndexStore) -> Result<IndexMeta> {
        let path = dataset_path.as_ref();
        let dataset = Dataset::from_path(path).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "dataset rejected");
        })?;
        self.build_dataset(dataset, store)
    }

    pub fn build_dataset(&self, dataset: Dataset, store: &dyn IndexStore) -> Result<IndexMeta> {
        let index = self.index_dataset(dataset)?;
        store.put(&index)?;
        tracing::info!(
            num_docs = index.meta.num_docs,
            num_terms = index.meta.num_terms,
            location = %store.location(),
            "index build complete"
        );
        Ok(index.meta)
    }

    /// Validate and vectorize without touching storage.
    pub fn index_dataset(&self, dataset: Dataset) -> Result<PersistedIndex> {
        if let Err(e) = dataset.require_column(DESCRIPTION_COLUMN) {
            tracing::warn!(columns = ?dataset.columns, "dataset rejected: missing description column");
            return Err(e);
        }
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&dataset.descriptions(), self.config);
        tracing::info!(num_docs = vectors.len(), num_terms = vectorizer.vocabulary_len(), "vectorized descriptions");

        let meta = IndexMeta {
            version: INDEX_FORMAT_VERSION,
            num_docs: vectors.len() as u32,
            num_terms: vectorizer.vocabulary_len() as u32,
            created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "".into()),
        };
        Ok(PersistedIndex { meta, vectorizer, vectors, dataset })
    }
}
