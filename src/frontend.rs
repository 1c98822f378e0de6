//! Presentation boundary of the gallery loop.

use tracing::{debug, error, info};

use crate::events::Alert;
use crate::handle::ImageHandle;
use crate::session::Controls;
use crate::surface::DisplaySurface;

/// Receives every visible change. Called only from the gallery loop, one
/// call at a time, so implementations need no synchronization of their own.
pub trait Frontend: Send {
    fn slot_changed(&mut self, slot: usize, image: &ImageHandle);
    fn progress(&mut self, value: f64);
    fn status(&mut self, text: &str);
    fn controls(&mut self, controls: Controls);
    fn alert(&mut self, alert: &Alert);
}

/// Headless frontend that renders the gallery as log lines.
#[derive(Debug, Default)]
pub struct TracingFrontend {
    last_progress_step: Option<u8>,
}

impl Frontend for TracingFrontend {
    fn slot_changed(&mut self, slot: usize, image: &ImageHandle) {
        let pos = DisplaySurface::position(slot);
        debug!(slot, row = pos.row, col = pos.col, url = %image, "slot updated");
    }

    fn progress(&mut self, value: f64) {
        // log in 10% steps; per-image reports go to trace
        let step = (value.clamp(0.0, 1.0) * 10.0).floor() as u8;
        tracing::trace!(progress = value, "progress");
        if self.last_progress_step != Some(step) {
            self.last_progress_step = Some(step);
            info!(percent = u32::from(step) * 10, "progress");
        }
    }

    fn status(&mut self, text: &str) {
        info!("{text}");
    }

    fn controls(&mut self, controls: Controls) {
        debug!(
            load = controls.load_enabled,
            play = controls.play_enabled,
            label = %controls.play_label,
            "controls"
        );
    }

    fn alert(&mut self, alert: &Alert) {
        error!(title = %alert.title, "{}", alert.body);
    }
}
