// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threshold rules: when does scrolling count as "near the end"?

use crate::geometry::NormalizedMetrics;

/// The rule a detector checks normalized metrics against.
///
/// The default is [`ThresholdRule::viewport_extent`]: fire once less than one
/// viewport's worth of content remains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdRule {
    /// Exceeded when the scrolled fraction of the scrollable extent is strictly
    /// greater than the given fraction (typically in `0..1`).
    Percentage(f64),
    /// Exceeded when the distance left to the end of the content is strictly
    /// smaller than the given distance.
    ///
    /// [`ThresholdRule::VIEWPORT_EXTENT`] stands for the viewport's extent along
    /// the active axis; any value below it is treated as `0`.
    FixedDistance(f64),
}

impl ThresholdRule {
    /// Fixed distance sentinel meaning "one viewport extent along the active axis".
    pub const VIEWPORT_EXTENT: f64 = -1.0;

    /// A percentage rule.
    #[must_use]
    pub const fn percentage(fraction: f64) -> Self {
        Self::Percentage(fraction)
    }

    /// A fixed distance rule.
    #[must_use]
    pub const fn fixed_distance(distance: f64) -> Self {
        Self::FixedDistance(distance)
    }

    /// A fixed distance rule of one viewport extent.
    #[must_use]
    pub const fn viewport_extent() -> Self {
        Self::FixedDistance(Self::VIEWPORT_EXTENT)
    }

    /// The concrete threshold this rule compares against.
    ///
    /// For [`Percentage`](Self::Percentage) this is the fraction itself. For
    /// [`FixedDistance`](Self::FixedDistance) the sentinel resolves to
    /// `viewport_extent` and anything below the sentinel resolves to `0`.
    #[must_use]
    pub fn resolved_value(&self, viewport_extent: f64) -> f64 {
        match *self {
            Self::Percentage(fraction) => fraction,
            Self::FixedDistance(distance) if distance == Self::VIEWPORT_EXTENT => viewport_extent,
            Self::FixedDistance(distance) if distance < Self::VIEWPORT_EXTENT => 0.0,
            Self::FixedDistance(distance) => distance,
        }
    }

    /// Returns `true` if `metrics` are past `resolved`, as produced by
    /// [`resolved_value`](Self::resolved_value).
    ///
    /// Unmeasurable metrics never exceed a rule.
    #[must_use]
    pub fn is_exceeded(&self, metrics: &NormalizedMetrics, resolved: f64) -> bool {
        if !metrics.is_measurable() {
            return false;
        }
        match self {
            Self::Percentage(_) => metrics.progress() > resolved,
            Self::FixedDistance(_) => metrics.remaining() < resolved,
        }
    }
}

impl Default for ThresholdRule {
    fn default() -> Self {
        Self::viewport_extent()
    }
}
