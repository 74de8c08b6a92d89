//! Windowed presentation of a filtered view.
//!
//! The rendering layer only materializes the rows inside the visible
//! window. [`Viewport`] keeps the scroll offset (its only state) and asks an
//! [`ItemRenderer`] for exactly the rows in `[offset, offset + size)`,
//! clamped to however many rows the view currently has. The view may
//! shrink between frames (after a delete, or a filter change), so every
//! request is clamped against the count at presentation time.

use std::ops::Range;

use tasksync_proto::Task;

use crate::filter::FilteredView;

/// Default number of rows in a window.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Receives the rows of one window.
pub trait ItemRenderer {
    /// Render `task` at filtered position `offset`.
    fn render_item(&mut self, offset: usize, task: &Task);
}

impl<F: FnMut(usize, &Task)> ItemRenderer for F {
    fn render_item(&mut self, offset: usize, task: &Task) {
        self(offset, task);
    }
}

/// Scroll position over a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
}

impl Viewport {
    /// A viewport scrolled to the top.
    #[must_use]
    pub const fn new() -> Self {
        Self { offset: 0 }
    }

    /// A viewport starting at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self { offset }
    }

    /// Current first visible position.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Scrolls to an absolute position.
    pub const fn scroll_to(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Scrolls by `delta` rows, stopping at the top.
    pub const fn scroll_by(&mut self, delta: isize) {
        self.offset = self.offset.saturating_add_signed(delta);
    }

    /// Pulls the offset back so a window of `size` rows over `count` rows
    /// stays filled where possible.
    pub fn clamp(&mut self, count: usize, size: usize) {
        self.offset = self.offset.min(count.saturating_sub(size.max(1)));
    }

    /// The positions a window of `size` rows covers over `count` rows.
    ///
    /// Always within `0..=count`; empty when the offset is past the end.
    #[must_use]
    pub fn window(&self, count: usize, size: usize) -> Range<usize> {
        let start = self.offset.min(count);
        let end = start.saturating_add(size).min(count);
        start..end
    }

    /// Clamps to the view, then renders the visible rows.
    ///
    /// Returns the range of filtered positions that were rendered.
    pub fn present<R: ItemRenderer + ?Sized>(
        &mut self,
        view: &FilteredView<'_>,
        size: usize,
        renderer: &mut R,
    ) -> Range<usize> {
        self.clamp(view.len(), size);
        let range = self.window(view.len(), size);
        for (position, task) in view.window(range.clone()) {
            renderer.render_item(position, task);
        }
        tracing::trace!(
            offset = self.offset,
            count = view.len(),
            rendered = range.len(),
            "window presented"
        );
        range
    }
}
