use crate::catalog::CatalogEntry;
use crate::embed::Embedding;

/// One ranked candidate from a top-K query. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub name: String,
    pub distance: f32,
}

/// Euclidean distance between two embeddings.
///
/// Both vectors must have the same length; the caller guarantees this
/// (the store rejects mixed dimensionalities at load time and the CLI
/// checks the probe at the boundary).
pub fn euclidean(a: &Embedding, b: &Embedding) -> f32 {
    debug_assert_eq!(a.dim(), b.dim());
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Ranks the catalog against `query` and returns the `k` closest entries,
/// ordered by ascending distance. Ties keep catalog order. An empty catalog
/// yields an empty result.
pub fn rank(query: &Embedding, catalog: &[CatalogEntry], k: usize) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = catalog
        .iter()
        .map(|entry| MatchResult {
            name: entry.name.clone(),
            distance: euclidean(query, &entry.encoding),
        })
        .collect();
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results.truncate(k);
    results
}
