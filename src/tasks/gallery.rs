use std::sync::Arc;

use anyhow::Result;
use reqwest::Url;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::RotationBuffer;
use crate::catalog::{CatalogClient, SearchQuery, SearchRequest};
use crate::config::Configuration;
use crate::events::{
    Alert, GalleryCommand, GallerySnapshot, LoadEvent, LoadEventKind, LoadedGallery,
};
use crate::error::GalleryError;
use crate::frontend::Frontend;
use crate::handle::ImageHandle;
use crate::session::{SessionSM, SessionState};
use crate::surface::DisplaySurface;
use crate::tasks::loader::{self, Selection};
use crate::tasks::rotation::RotationScheduler;

pub const IDLE_STATUS: &str = "Type in a term, select a media type, then click the button.";
pub const LOADING_STATUS: &str = "Getting images...";
pub const FAILED_STATUS: &str = "Last attempt to get images failed...";

const LOAD_EVENT_CAPACITY: usize = 64;

/// The single-threaded gallery context.
///
/// Owns the grid, the live rotation buffer, the session and the scheduler;
/// every visible mutation happens here. A load builds its own buffer on a
/// blocking worker and hands it over on `load_rx`, so the live buffer has
/// exactly one mutator at any time.
pub async fn run<F: Frontend>(
    cfg: Configuration,
    catalog: Arc<dyn CatalogClient>,
    frontend: F,
    mut commands: Receiver<GalleryCommand>,
    cancel: CancellationToken,
) -> Result<()> {
    let (load_tx, mut load_rx) = mpsc::channel::<LoadEvent>(LOAD_EVENT_CAPACITY);
    let mut gallery = Gallery::new(&cfg, catalog, frontend, load_tx, cancel.clone())?;
    gallery.present_initial();

    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting gallery loop");
                break;
            }

            maybe_cmd = commands.recv() => match maybe_cmd {
                Some(cmd) => gallery.on_command(cmd),
                None => {
                    info!("command channel closed; exiting gallery loop");
                    break;
                }
            },

            Some(ev) = load_rx.recv() => gallery.on_load_event(ev),

            _ = gallery.scheduler.tick(), if gallery.scheduler.is_armed() => gallery.on_tick(),
        }
    }

    gallery.scheduler.disarm();
    Ok(())
}

struct Gallery<F> {
    catalog: Arc<dyn CatalogClient>,
    frontend: F,
    endpoint: Url,
    result_limit: u32,
    selection: Selection,
    session: SessionSM,
    surface: DisplaySurface,
    buffer: Option<RotationBuffer>,
    scheduler: RotationScheduler,
    progress: f64,
    status: String,
    load_seq: u64,
    load_tx: Sender<LoadEvent>,
    cancel: CancellationToken,
}

impl<F: Frontend> Gallery<F> {
    fn new(
        cfg: &Configuration,
        catalog: Arc<dyn CatalogClient>,
        frontend: F,
        load_tx: Sender<LoadEvent>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let placeholder = ImageHandle::new(cfg.placeholder_image.as_str());
        Ok(Self {
            catalog,
            frontend,
            endpoint: cfg.endpoint()?,
            result_limit: cfg.result_limit,
            selection: Selection {
                order: cfg.initial_order,
                seed: cfg.shuffle_seed,
            },
            session: SessionSM::new(),
            surface: DisplaySurface::new(&placeholder),
            buffer: None,
            scheduler: RotationScheduler::new(cfg.rotation_interval, cfg.rotation_seed),
            progress: 0.0,
            status: IDLE_STATUS.to_string(),
            load_seq: 0,
            load_tx,
            cancel,
        })
    }

    fn present_initial(&mut self) {
        for (slot, image) in self.surface.iter().enumerate() {
            self.frontend.slot_changed(slot, image);
        }
        self.frontend.controls(self.session.controls());
        self.frontend.progress(self.progress);
        self.frontend.status(&self.status);
    }

    fn on_command(&mut self, cmd: GalleryCommand) {
        match cmd {
            GalleryCommand::Load(query) => self.start_load(query),
            GalleryCommand::TogglePlay => match self.session.current() {
                SessionState::Playing => self.pause(),
                _ => self.play(),
            },
            GalleryCommand::Pause => self.pause(),
            GalleryCommand::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("snapshot requester went away");
                }
            }
        }
    }

    fn start_load(&mut self, query: SearchQuery) {
        if self.session.current() == SessionState::Loading {
            warn!(term = %query.term, "a search is already running; ignoring load request");
            return;
        }
        // rotation must be stopped before anything about the next gallery exists
        self.pause();
        if self.session.on_load_requested().is_none() {
            warn!(state = ?self.session.current(), "load request rejected");
            return;
        }

        self.load_seq += 1;
        self.frontend.controls(self.session.controls());
        self.set_status(LOADING_STATUS);
        self.set_progress(0.0);

        let request = SearchRequest::new(&self.endpoint, query, self.result_limit);
        loader::spawn(
            self.load_seq,
            Arc::clone(&self.catalog),
            request,
            self.selection,
            self.load_tx.clone(),
            self.cancel.child_token(),
        );
    }

    fn play(&mut self) {
        if self.session.on_play().is_none() {
            warn!(state = ?self.session.current(), "nothing to play");
            return;
        }
        self.scheduler.arm();
        info!(period = ?self.scheduler.period(), "rotation started");
        self.frontend.controls(self.session.controls());
    }

    /// Idempotent; only the play label is refreshed when already stopped.
    fn pause(&mut self) {
        if self.scheduler.disarm() {
            info!("rotation stopped");
        }
        self.session.on_pause();
        self.frontend.controls(self.session.controls());
    }

    fn on_tick(&mut self) {
        let Some(buffer) = self.buffer.as_mut() else {
            warn!("rotation tick without a gallery; stopping");
            self.pause();
            return;
        };
        if let Some(step) = self.scheduler.rotate(buffer, &mut self.surface) {
            debug!(slot = step.slot, shown = %step.shown, displaced = %step.displaced, "rotated");
            self.frontend.slot_changed(step.slot, &step.shown);
        }
    }

    fn on_load_event(&mut self, ev: LoadEvent) {
        if ev.load != self.load_seq || self.session.current() != SessionState::Loading {
            debug!(load = ev.load, current = self.load_seq, "dropping stale load event");
            return;
        }
        match ev.kind {
            LoadEventKind::Progress(fraction) => {
                // reports of one load only ever grow
                if fraction >= self.progress {
                    self.set_progress(fraction);
                }
            }
            LoadEventKind::Finished { uri, outcome } => match outcome {
                Ok(loaded) => self.finish_success(&uri, loaded),
                Err(err) => self.finish_failure(&uri, &err),
            },
        }
    }

    fn finish_success(&mut self, uri: &str, loaded: LoadedGallery) {
        let LoadedGallery { buffer, fill } = loaded;
        for slot in self.surface.apply_fill(fill) {
            if let Some(image) = self.surface.get(slot) {
                self.frontend.slot_changed(slot, image);
            }
        }
        info!(distinct = buffer.len(), "gallery ready");
        self.buffer = Some(buffer);
        self.set_progress(1.0);
        self.session.on_load_finished(true);
        self.frontend.controls(self.session.controls());
        self.set_status(uri);
    }

    fn finish_failure(&mut self, uri: &str, err: &GalleryError) {
        warn!(%uri, "search failed: {err}");
        self.frontend.alert(&Alert::load_failed(uri, err));
        self.set_status(FAILED_STATUS);
        self.set_progress(1.0);
        self.session.on_load_finished(false);
        if self.session.has_gallery() {
            self.pause();
        } else {
            self.frontend.controls(self.session.controls());
        }
    }

    fn set_progress(&mut self, value: f64) {
        self.progress = value;
        self.frontend.progress(value);
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.frontend.status(text);
    }

    fn snapshot(&self) -> GallerySnapshot {
        GallerySnapshot {
            state: self.session.current(),
            controls: self.session.controls(),
            progress: self.progress,
            status: self.status.clone(),
            slots: self.surface.to_vec(),
            buffer: self
                .buffer
                .as_ref()
                .map(RotationBuffer::to_vec)
                .unwrap_or_default(),
        }
    }
}
