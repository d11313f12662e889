// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll geometry snapshots and their per-axis normalization.
//!
//! A [`ScrollGeometry`] is what the hosting view reports on every scroll: where the
//! content is scrolled to, how large the viewport and content are, and the edge
//! insets around the content. [`ScrollGeometry::normalized`] collapses that onto a
//! single [`Axis`] as a pair of numbers in content space:
//!
//! - `effective_offset = offset + leading_inset`
//! - `scrollable_extent = content_extent - (viewport_extent - leading_inset - trailing_inset)`
//!
//! ```
//! use kurbo::{Insets, Point, Size};
//! use understory_pagination::{Axis, ScrollGeometry};
//!
//! let geometry = ScrollGeometry {
//!     content_offset: Point::new(0.0, 300.0),
//!     viewport_size: Size::new(320.0, 400.0),
//!     content_size: Size::new(320.0, 2000.0),
//!     insets: Insets::new(0.0, 20.0, 0.0, 0.0),
//! };
//!
//! let metrics = geometry.normalized(Axis::Vertical);
//! assert_eq!(metrics.effective_offset, 320.0);
//! assert_eq!(metrics.scrollable_extent, 1620.0);
//! ```

use kurbo::{Insets, Point, Size};

/// The scroll direction a detector measures along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Content scrolls left/right; widths and `x` offsets participate.
    Horizontal,
    /// Content scrolls up/down; heights and `y` offsets participate.
    #[default]
    Vertical,
}

impl Axis {
    /// Component of a point along this axis.
    #[must_use]
    pub const fn of_point(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Component of a size along this axis.
    #[must_use]
    pub const fn of_size(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// `(leading, trailing)` insets along this axis.
    ///
    /// Leading is left/top, trailing is right/bottom.
    #[must_use]
    pub const fn of_insets(self, insets: Insets) -> (f64, f64) {
        match self {
            Self::Horizontal => (insets.x0, insets.x1),
            Self::Vertical => (insets.y0, insets.y1),
        }
    }
}

/// A snapshot of a scrollable view's geometry, produced fresh for every scroll event.
///
/// Insets follow Kurbo's convention: `x0` is left, `y0` is top, `x1` is right and
/// `y1` is bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollGeometry {
    /// Current scroll position of the content's origin.
    pub content_offset: Point,
    /// Size of the visible viewport.
    pub viewport_size: Size,
    /// Total size of the scrollable content.
    pub content_size: Size,
    /// Edge insets around the content.
    pub insets: Insets,
}

impl ScrollGeometry {
    /// Creates a geometry snapshot with zero insets.
    #[must_use]
    pub const fn new(content_offset: Point, viewport_size: Size, content_size: Size) -> Self {
        Self {
            content_offset,
            viewport_size,
            content_size,
            insets: Insets::ZERO,
        }
    }

    /// Returns the same geometry with `insets` applied.
    #[must_use]
    pub const fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Returns the same geometry scrolled to `content_offset`.
    #[must_use]
    pub const fn with_offset(mut self, content_offset: Point) -> Self {
        self.content_offset = content_offset;
        self
    }

    /// Raw offset along `axis`, without inset adjustment.
    #[must_use]
    pub const fn offset_along(&self, axis: Axis) -> f64 {
        axis.of_point(self.content_offset)
    }

    /// Viewport extent along `axis`.
    #[must_use]
    pub const fn viewport_extent(&self, axis: Axis) -> f64 {
        axis.of_size(self.viewport_size)
    }

    /// Content extent along `axis`.
    #[must_use]
    pub const fn content_extent(&self, axis: Axis) -> f64 {
        axis.of_size(self.content_size)
    }

    /// Offset along `axis` adjusted by the leading inset.
    #[must_use]
    pub const fn effective_offset(&self, axis: Axis) -> f64 {
        let (leading, _) = axis.of_insets(self.insets);
        self.offset_along(axis) + leading
    }

    /// Collapses this snapshot onto `axis`.
    #[must_use]
    pub const fn normalized(&self, axis: Axis) -> NormalizedMetrics {
        let (leading, trailing) = axis.of_insets(self.insets);
        let visible = self.viewport_extent(axis) - leading - trailing;
        NormalizedMetrics {
            scrollable_extent: self.content_extent(axis) - visible,
            effective_offset: self.effective_offset(axis),
        }
    }
}

/// Scroll progress along one axis, in inset-adjusted content units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedMetrics {
    /// How far the content can be scrolled in total.
    pub scrollable_extent: f64,
    /// How far the content is currently scrolled.
    pub effective_offset: f64,
}

impl NormalizedMetrics {
    /// Returns `true` if these metrics can be measured against a rule at all.
    ///
    /// Content that cannot scroll, or an offset pulled before the start, never
    /// counts as approaching the end.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.scrollable_extent > 0.0 && self.effective_offset >= 0.0
    }

    /// Fraction of the scrollable extent already scrolled.
    ///
    /// Only meaningful when [`is_measurable`](Self::is_measurable) holds.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.effective_offset / self.scrollable_extent
    }

    /// Distance left until the end of the content.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        (self.scrollable_extent - self.effective_offset).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, NormalizedMetrics, ScrollGeometry};
    use kurbo::{Insets, Point, Size};

    #[test]
    fn vertical_uses_heights_and_top_bottom_insets() {
        let geometry = ScrollGeometry::new(
            Point::new(7.0, 100.0),
            Size::new(50.0, 200.0),
            Size::new(60.0, 1000.0),
        )
        .with_insets(Insets::new(3.0, 10.0, 4.0, 30.0));

        let metrics = geometry.normalized(Axis::Vertical);
        assert_eq!(metrics.effective_offset, 110.0);
        // 1000 - (200 - 10 - 30)
        assert_eq!(metrics.scrollable_extent, 840.0);
    }

    #[test]
    fn horizontal_uses_widths_and_left_right_insets() {
        let geometry = ScrollGeometry::new(
            Point::new(100.0, 7.0),
            Size::new(200.0, 50.0),
            Size::new(1000.0, 60.0),
        )
        .with_insets(Insets::new(10.0, 3.0, 30.0, 4.0));

        let metrics = geometry.normalized(Axis::Horizontal);
        assert_eq!(metrics.effective_offset, 110.0);
        assert_eq!(metrics.scrollable_extent, 840.0);
    }

    #[test]
    fn content_smaller_than_viewport_is_not_measurable() {
        let geometry = ScrollGeometry::new(
            Point::ZERO,
            Size::new(320.0, 480.0),
            Size::new(320.0, 300.0),
        );
        let metrics = geometry.normalized(Axis::Vertical);
        assert!(metrics.scrollable_extent < 0.0);
        assert!(!metrics.is_measurable());
    }

    #[test]
    fn negative_offset_is_not_measurable() {
        let metrics = NormalizedMetrics {
            scrollable_extent: 100.0,
            effective_offset: -1.0,
        };
        assert!(!metrics.is_measurable());
    }

    #[test]
    fn remaining_is_absolute_distance_to_end() {
        let metrics = NormalizedMetrics {
            scrollable_extent: 100.0,
            effective_offset: 130.0,
        };
        assert_eq!(metrics.remaining(), 30.0);
    }
}
