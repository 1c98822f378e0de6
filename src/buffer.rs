//! FIFO cycle over image handles used to implement the endless rotation.

use std::collections::VecDeque;

use crate::handle::ImageHandle;
use crate::surface::{GRID_SLOTS, GridFill};

/// A closed FIFO cycle of image handles.
///
/// Every pop performed by the gallery is paired with a push, so once a
/// search has populated the buffer its length never changes.
#[derive(Debug, Clone, Default)]
pub struct RotationBuffer {
    items: VecDeque<ImageHandle>,
}

impl RotationBuffer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of items contained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the next handle to surface without removing it.
    #[must_use]
    pub fn front(&self) -> Option<&ImageHandle> {
        self.items.front()
    }

    /// Borrow the most recently recycled handle.
    #[must_use]
    pub fn back(&self) -> Option<&ImageHandle> {
        self.items.back()
    }

    pub fn pop_front(&mut self) -> Option<ImageHandle> {
        self.items.pop_front()
    }

    pub fn push_back(&mut self, handle: ImageHandle) {
        self.items.push_back(handle);
    }

    /// Initial pass that fills the grid.
    ///
    /// For each slot in order the front handle is popped, assigned to the
    /// slot and pushed straight back, so the handles shown end up at the
    /// tail and any remaining ones sit at the front, next in line.
    /// Returns `None` without touching the buffer if it holds fewer handles
    /// than there are slots.
    pub fn warm_rotation(&mut self) -> Option<GridFill> {
        if self.items.len() < GRID_SLOTS {
            return None;
        }
        let mut fill = Vec::with_capacity(GRID_SLOTS);
        for _ in 0..GRID_SLOTS {
            let handle = self.items.pop_front()?;
            fill.push(handle.clone());
            self.items.push_back(handle);
        }
        fill.try_into().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.items.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<ImageHandle> {
        self.items.iter().cloned().collect()
    }
}

impl FromIterator<ImageHandle> for RotationBuffer {
    fn from_iter<I: IntoIterator<Item = ImageHandle>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(n: usize) -> Vec<ImageHandle> {
        (0..n)
            .map(|i| ImageHandle::new(format!("https://img.example/{i}.jpg")))
            .collect()
    }

    #[test]
    fn warm_rotation_moves_shown_handles_to_the_tail() {
        let all = handles(25);
        let mut buf: RotationBuffer = all.iter().cloned().collect();

        let fill = buf.warm_rotation().expect("enough handles to fill the grid");

        assert_eq!(fill.to_vec(), all[..GRID_SLOTS].to_vec());
        assert_eq!(buf.len(), 25);
        let order = buf.to_vec();
        assert_eq!(order[..5], all[GRID_SLOTS..]);
        assert_eq!(order[5..], all[..GRID_SLOTS]);
    }

    #[test]
    fn warm_rotation_with_exactly_one_grid_is_a_full_cycle() {
        let all = handles(GRID_SLOTS);
        let mut buf: RotationBuffer = all.iter().cloned().collect();
        buf.warm_rotation().unwrap();
        assert_eq!(buf.to_vec(), all);
    }

    #[test]
    fn warm_rotation_refuses_short_buffers() {
        let all = handles(GRID_SLOTS - 1);
        let mut buf: RotationBuffer = all.iter().cloned().collect();
        assert!(buf.warm_rotation().is_none());
        assert_eq!(buf.to_vec(), all);
    }
}
