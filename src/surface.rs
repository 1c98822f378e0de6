//! Fixed 4x5 grid of image slots.

use crate::handle::ImageHandle;

pub const GRID_ROWS: usize = 4;
pub const GRID_COLS: usize = 5;
pub const GRID_SLOTS: usize = GRID_ROWS * GRID_COLS;

/// One handle per slot, in slot order.
pub type GridFill = [ImageHandle; GRID_SLOTS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// The display grid. Every slot holds exactly one handle at all times.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    slots: GridFill,
}

impl DisplaySurface {
    /// A surface showing `placeholder` in every slot.
    pub fn new(placeholder: &ImageHandle) -> Self {
        Self {
            slots: std::array::from_fn(|_| placeholder.clone()),
        }
    }

    /// Row-major grid position of `slot`.
    #[must_use]
    pub const fn position(slot: usize) -> GridPosition {
        GridPosition {
            row: slot / GRID_COLS,
            col: slot % GRID_COLS,
        }
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&ImageHandle> {
        self.slots.get(slot)
    }

    /// Put `handle` into `slot` and return what it displaced.
    ///
    /// Returns `None` (and leaves the surface alone) for an out-of-range slot.
    pub fn replace(&mut self, slot: usize, handle: ImageHandle) -> Option<ImageHandle> {
        self.slots
            .get_mut(slot)
            .map(|current| std::mem::replace(current, handle))
    }

    /// Overwrite every slot, returning the indices whose handle changed.
    pub fn apply_fill(&mut self, fill: GridFill) -> Vec<usize> {
        let mut changed = Vec::new();
        for (slot, handle) in fill.into_iter().enumerate() {
            if self.slots[slot] != handle {
                self.slots[slot] = handle;
                changed.push(slot);
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.slots.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<ImageHandle> {
        self.slots.to_vec()
    }
}
