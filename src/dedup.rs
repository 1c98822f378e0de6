use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::catalog::SearchResult;

/// Distinct artwork references in first-seen order.
///
/// Records without an `artworkUrl100` (or with an empty one) contribute
/// nothing.
pub fn distinct_artwork(results: &[SearchResult]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(results.len());
    let mut distinct = Vec::new();
    for url in results
        .iter()
        .filter_map(|r| r.artwork_url_100.as_deref())
        .filter(|url| !url.is_empty())
    {
        if seen.insert(url) {
            distinct.push(url.to_string());
        }
    }
    distinct
}

/// Order in which distinct references enter the rotation buffer, which
/// decides the twenty images shown first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialOrder {
    /// Catalog relevance order, duplicates dropped.
    #[default]
    Response,
    /// Uniform shuffle.
    Shuffle,
}

impl InitialOrder {
    pub fn apply(self, urls: &mut [String], seed: Option<u64>) {
        match self {
            Self::Response => {}
            Self::Shuffle => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                urls.shuffle(&mut rng);
            }
        }
    }
}
