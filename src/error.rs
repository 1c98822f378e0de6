use thiserror::Error;

use crate::catalog::RawResponse;
use crate::surface::GRID_SLOTS;

/// Failures of one search cycle.
///
/// Every variant is caught at the boundary of a load and rendered as a
/// single alert; none of them terminate the gallery.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The catalog answered with a non-success status.
    #[error("{0}")]
    Network(RawResponse),

    /// Too few distinct artwork references to fill the grid.
    #[error(
        "{found} distinct results found, but {needed} or more are needed.",
        needed = GRID_SLOTS + 1
    )]
    InsufficientResults { found: usize },

    /// The background load was cancelled or its worker went away.
    #[error("search interrupted before it completed")]
    Interrupted,

    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not a catalog search payload.
    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}
