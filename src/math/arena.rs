use serde::{Deserialize, Serialize};

/// A window of `len` scalars starting at `offset` inside a `WeightArena`.
///
/// Views are plain indices, so they stay valid for the lifetime of the arena
/// that issued them. Reading or writing through a view always goes back
/// through the arena, which bounds-checks the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightView {
    offset: usize,
    len: usize,
}

impl WeightView {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Contiguous, fixed-capacity scalar buffer that hands out disjoint views.
///
/// Lifecycle:
/// 1. `preallocate` reserves every slot up front (zero-filled).
/// 2. `allocate_view` carves consecutive, non-overlapping windows.
/// 3. `seal` closes allocation; from then on the buffer can be read and
///    written through views but no new view can be issued.
///
/// The buffer never grows after `preallocate`, so an issued view can never be
/// invalidated by a relocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightArena {
    data: Vec<f64>,
    cursor: usize,
    sealed: bool,
}

impl WeightArena {
    pub fn preallocate(total_count: usize) -> WeightArena {
        WeightArena {
            data: vec![0.0; total_count],
            cursor: 0,
            sealed: false,
        }
    }

    /// Returns a view over the next `count` unused slots.
    ///
    /// # Panics
    /// Panics if the arena is sealed or if the view would run past the
    /// preallocated capacity.
    pub fn allocate_view(&mut self, count: usize) -> WeightView {
        assert!(!self.sealed, "cannot allocate a view from a sealed arena");
        let end = self.cursor + count;
        assert!(
            end <= self.data.len(),
            "arena overflow: requested {} slots at offset {} but capacity is {}",
            count,
            self.cursor,
            self.data.len()
        );
        let view = WeightView { offset: self.cursor, len: count };
        self.cursor = end;
        view
    }

    /// Closes allocation. Views may only be dereferenced after this point.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of slots handed out so far.
    pub fn allocated(&self) -> usize {
        self.cursor
    }

    pub fn view(&self, view: WeightView) -> &[f64] {
        assert!(self.sealed, "arena must be sealed before views are read");
        &self.data[view.range()]
    }

    pub fn view_mut(&mut self, view: WeightView) -> &mut [f64] {
        assert!(self.sealed, "arena must be sealed before views are written");
        &mut self.data[view.range()]
    }

    /// Zeroes every slot in `view`.
    pub fn clear(&mut self, view: WeightView) {
        self.view_mut(view).iter_mut().for_each(|x| *x = 0.0);
    }

    /// The whole backing buffer, including unallocated tail slots.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
