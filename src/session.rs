use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStateChange {
    pub from: SessionState,
    pub to: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayLabel {
    Play,
    Pause,
}

impl fmt::Display for PlayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
        })
    }
}

/// Which controls a frontend should offer in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub load_enabled: bool,
    pub play_enabled: bool,
    pub play_label: PlayLabel,
}

/// Gates which gallery operations may run.
///
/// Rejected transitions return `None` and leave the state untouched, so
/// the buffer's single-owner rule holds even without any rendered control.
pub struct SessionSM {
    state: SessionState,
    has_gallery: bool,
}

impl SessionSM {
    pub const fn new() -> Self {
        Self {
            state: SessionState::Idle,
            has_gallery: false,
        }
    }

    pub const fn current(&self) -> SessionState {
        self.state
    }

    /// Whether a search has ever completed successfully.
    pub const fn has_gallery(&self) -> bool {
        self.has_gallery
    }

    /// Callers stop rotation first, so a load never starts from `Playing`.
    pub fn on_load_requested(&mut self) -> Option<SessionStateChange> {
        match self.state {
            SessionState::Idle | SessionState::Ready => self.goto(SessionState::Loading),
            SessionState::Loading | SessionState::Playing => None,
        }
    }

    pub fn on_load_finished(&mut self, success: bool) -> Option<SessionStateChange> {
        if self.state != SessionState::Loading {
            return None;
        }
        if success {
            self.has_gallery = true;
        }
        if self.has_gallery {
            self.goto(SessionState::Ready)
        } else {
            self.goto(SessionState::Idle)
        }
    }

    pub fn on_play(&mut self) -> Option<SessionStateChange> {
        match self.state {
            SessionState::Ready => self.goto(SessionState::Playing),
            _ => None,
        }
    }

    pub fn on_pause(&mut self) -> Option<SessionStateChange> {
        match self.state {
            SessionState::Playing => self.goto(SessionState::Ready),
            _ => None,
        }
    }

    pub const fn controls(&self) -> Controls {
        match self.state {
            SessionState::Idle => Controls {
                load_enabled: true,
                play_enabled: false,
                play_label: PlayLabel::Play,
            },
            SessionState::Loading => Controls {
                load_enabled: false,
                play_enabled: false,
                play_label: PlayLabel::Play,
            },
            SessionState::Ready => Controls {
                load_enabled: true,
                play_enabled: true,
                play_label: PlayLabel::Play,
            },
            SessionState::Playing => Controls {
                load_enabled: true,
                play_enabled: true,
                play_label: PlayLabel::Pause,
            },
        }
    }

    fn goto(&mut self, to: SessionState) -> Option<SessionStateChange> {
        if self.state == to {
            return None;
        }
        let ch = SessionStateChange {
            from: self.state,
            to,
        };
        self.state = to;
        Some(ch)
    }
}

impl Default for SessionSM {
    fn default() -> Self {
        Self::new()
    }
}
