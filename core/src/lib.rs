//! Description retrieval: build a TF-IDF index over the `Description` column
//! of a CSV dataset and rank its records against short summaries.

pub mod builder;
pub mod dataset;
pub mod error;
pub mod index;
pub mod persist;
pub mod retriever;
pub mod tokenizer;
pub mod vectorizer;

pub use builder::IndexBuilder;
pub use dataset::{Dataset, Record, DESCRIPTION_COLUMN};
pub use error::{Result, RetrievalError};
pub use index::{IndexMeta, PersistedIndex, SparseVector, TermId};
pub use persist::{FileStore, IndexStore, MemoryStore, SledStore, DEFAULT_INDEX_PATH};
pub use retriever::{Retriever, ScoredRecord, DEFAULT_TOP_K};
pub use tokenizer::AnalyzerConfig;
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
