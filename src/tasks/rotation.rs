use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::buffer::RotationBuffer;
use crate::handle::ImageHandle;
use crate::surface::{DisplaySurface, GRID_SLOTS};

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStep {
    pub slot: usize,
    pub shown: ImageHandle,
    pub displaced: ImageHandle,
}

/// Steady-state rotation law.
///
/// Picks a slot uniformly, shows the buffer's front handle there and
/// recycles that same handle at the back, so the buffer stays a
/// round-robin cycle over every distinct handle. The handle that leaves
/// the grid is still queued further back. Returns `None` only for an
/// empty buffer.
pub fn rotate_once<R: Rng>(
    buffer: &mut RotationBuffer,
    surface: &mut DisplaySurface,
    rng: &mut R,
) -> Option<RotationStep> {
    let slot = rng.random_range(0..GRID_SLOTS);
    let shown = buffer.pop_front()?;
    buffer.push_back(shown.clone());
    let displaced = surface.replace(slot, shown.clone())?;
    Some(RotationStep {
        slot,
        shown,
        displaced,
    })
}

/// Periodic rotation timer, inert until armed.
///
/// Runs on the gallery loop; `tick` is a cancel-safe future suitable for
/// `tokio::select!` and never resolves while disarmed.
pub struct RotationScheduler {
    period: Duration,
    timer: Option<Interval>,
    rng: StdRng,
}

impl RotationScheduler {
    pub fn new(period: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            period,
            timer: None,
            rng,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    pub const fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Start ticking; the first tick fires one period from now.
    /// Arming an armed scheduler keeps its current phase.
    pub fn arm(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
    }

    /// Stop ticking. Returns whether the scheduler was armed.
    pub fn disarm(&mut self) -> bool {
        self.timer.take().is_some()
    }

    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    pub fn rotate(
        &mut self,
        buffer: &mut RotationBuffer,
        surface: &mut DisplaySurface,
    ) -> Option<RotationStep> {
        rotate_once(buffer, surface, &mut self.rng)
    }
}
