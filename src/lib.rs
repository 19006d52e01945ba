pub mod catalog;
pub mod config;
pub mod embed;
pub mod ingest;
pub mod matcher;

pub use catalog::{CatalogEntry, CatalogStore};
pub use embed::{CommandSource, Embedding, EmbeddingSource};
pub use matcher::MatchResult;
