use tokio::sync::oneshot;

use crate::buffer::RotationBuffer;
use crate::catalog::SearchQuery;
use crate::error::GalleryError;
use crate::handle::ImageHandle;
use crate::session::{Controls, SessionState};
use crate::surface::GridFill;

/// Requests accepted by the gallery loop.
#[derive(Debug)]
pub enum GalleryCommand {
    Load(SearchQuery),
    TogglePlay,
    Pause,
    Snapshot(oneshot::Sender<GallerySnapshot>),
}

/// Emitted by a load task; all events of one load share its generation.
#[derive(Debug)]
pub struct LoadEvent {
    pub load: u64,
    pub kind: LoadEventKind,
}

#[derive(Debug)]
pub enum LoadEventKind {
    Progress(f64),
    Finished {
        uri: String,
        outcome: Result<LoadedGallery, GalleryError>,
    },
}

/// A freshly populated buffer plus the grid contents picked by its warm
/// rotation; ownership moves to the gallery loop.
#[derive(Debug)]
pub struct LoadedGallery {
    pub buffer: RotationBuffer,
    pub fill: GridFill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn load_failed(uri: &str, err: &GalleryError) -> Self {
        Self {
            title: "Error".to_string(),
            body: format!("URI: {uri}\n\nException: {err}"),
        }
    }
}

/// Point-in-time copy of everything the gallery loop owns.
#[derive(Debug, Clone)]
pub struct GallerySnapshot {
    pub state: SessionState,
    pub controls: Controls,
    pub progress: f64,
    pub status: String,
    pub slots: Vec<ImageHandle>,
    pub buffer: Vec<ImageHandle>,
}
