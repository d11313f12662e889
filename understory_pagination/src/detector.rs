// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threshold detection: a pure evaluation step and a two-state detector around it.
//!
//! [`evaluate`] decides, for one geometry snapshot, whether a [`ThresholdRule`] is
//! newly exceeded. [`ThresholdDetector`] owns the state that `evaluate` needs
//! between events (the [`DetectorState`] and the last effective offset) and turns a
//! `Normal → Exceeded` transition into a [`ThresholdEvent`] plus a [`ResetHandle`].
//!
//! ## State machine
//!
//! - The detector starts in [`DetectorState::Normal`].
//! - A scroll event that exceeds the rule moves it to [`DetectorState::Exceeded`] and
//!   yields exactly one event. Further events yield nothing.
//! - The holder of the [`ResetHandle`] decides when (and whether) to re-arm it by
//!   calling [`ResetHandle::reset`]. [`ThresholdDetector::reset`] re-arms from outside
//!   and makes any outstanding handle stale.
//!
//! ```
//! use kurbo::{Point, Size};
//! use understory_pagination::{Axis, ScrollGeometry, ThresholdDetector, ThresholdRule};
//!
//! let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
//! let page = ScrollGeometry::new(Point::ZERO, Size::new(100.0, 100.0), Size::new(100.0, 1100.0));
//!
//! assert!(detector.handle_scroll(&page.with_offset(Point::new(0.0, 400.0))).is_none());
//!
//! let (event, reset) = detector
//!     .handle_scroll(&page.with_offset(Point::new(0.0, 600.0)))
//!     .expect("60% is past 50%");
//! assert_eq!(event.resolved_threshold, 0.5);
//!
//! // Further scrolling is ignored until the handle re-arms the detector.
//! assert!(detector.handle_scroll(&page.with_offset(Point::new(0.0, 700.0))).is_none());
//! reset.reset(true);
//! assert!(detector.handle_scroll(&page.with_offset(Point::new(0.0, 800.0))).is_some());
//! ```

use alloc::rc::{Rc, Weak};
use core::cell::Cell;

use crate::geometry::{Axis, NormalizedMetrics, ScrollGeometry};
use crate::rule::ThresholdRule;

/// Whether a detector is armed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetectorState {
    /// Armed: the next scroll past the threshold fires.
    #[default]
    Normal,
    /// Fired and waiting to be reset.
    Exceeded,
}

/// What a single evaluation decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// Nothing to report.
    Unchanged,
    /// The rule is newly exceeded.
    Exceeded {
        /// Threshold the metrics were compared against.
        resolved_threshold: f64,
        /// Metrics that crossed it.
        metrics: NormalizedMetrics,
    },
}

/// Result of [`evaluate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    /// What happened.
    pub outcome: Outcome,
    /// Offset to record for the next evaluation.
    ///
    /// This is always the effective offset of the evaluated geometry, whether or
    /// not the evaluation got past its gate.
    pub last_offset: f64,
}

impl Evaluation {
    /// Returns `true` if the rule was newly exceeded.
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        matches!(self.outcome, Outcome::Exceeded { .. })
    }
}

/// Evaluates one geometry snapshot against `rule`.
///
/// Evaluation only proceeds when `state` is [`DetectorState::Normal`], the content
/// has a non-zero extent along `axis`, and the effective offset has not moved
/// backward past `last_offset`. Both the backward guard and the returned
/// [`Evaluation::last_offset`] use the inset-adjusted effective offset.
///
/// Degenerate geometry (content that cannot scroll, offsets before the start)
/// never exceeds a rule.
#[must_use]
pub fn evaluate(
    geometry: &ScrollGeometry,
    axis: Axis,
    rule: &ThresholdRule,
    state: DetectorState,
    last_offset: f64,
) -> Evaluation {
    let offset = geometry.effective_offset(axis);
    let unchanged = Evaluation {
        outcome: Outcome::Unchanged,
        last_offset: offset,
    };

    if state != DetectorState::Normal
        || geometry.content_extent(axis) == 0.0
        || offset < last_offset
    {
        log::trace!("scroll to {offset} gated (state {state:?}, last offset {last_offset})");
        return unchanged;
    }

    let metrics = geometry.normalized(axis);
    let resolved_threshold = rule.resolved_value(geometry.viewport_extent(axis));
    if !rule.is_exceeded(&metrics, resolved_threshold) {
        return unchanged;
    }

    Evaluation {
        outcome: Outcome::Exceeded {
            resolved_threshold,
            metrics,
        },
        last_offset: offset,
    }
}

/// Delivered to the application when a detector transitions to
/// [`DetectorState::Exceeded`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdEvent {
    /// Axis the detector measures along.
    pub axis: Axis,
    /// Rule that was exceeded.
    pub rule: ThresholdRule,
    /// The rule's threshold after sentinel substitution.
    pub resolved_threshold: f64,
    /// Metrics of the scroll event that crossed the threshold.
    pub metrics: NormalizedMetrics,
}

#[derive(Clone, Copy, Debug)]
struct Arming {
    state: DetectorState,
    generation: u64,
}

/// Detects threshold crossings for one scrollable view.
#[derive(Debug)]
pub struct ThresholdDetector {
    axis: Axis,
    rule: ThresholdRule,
    last_offset: f64,
    arming: Rc<Cell<Arming>>,
}

impl ThresholdDetector {
    /// Creates an armed detector.
    #[must_use]
    pub fn new(axis: Axis, rule: ThresholdRule) -> Self {
        Self {
            axis,
            rule,
            last_offset: 0.0,
            arming: Rc::new(Cell::new(Arming {
                state: DetectorState::Normal,
                generation: 0,
            })),
        }
    }

    /// Axis this detector measures along.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Current rule.
    #[must_use]
    pub const fn rule(&self) -> ThresholdRule {
        self.rule
    }

    /// Replaces the rule. The detector state is left untouched.
    pub fn set_rule(&mut self, rule: ThresholdRule) {
        self.rule = rule;
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DetectorState {
        self.arming.get().state
    }

    /// Returns `true` if the detector has fired and not been reset.
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.state() == DetectorState::Exceeded
    }

    /// Effective offset recorded by the most recent scroll event.
    #[must_use]
    pub const fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Feeds one scroll event through the detector.
    ///
    /// Returns the event and its reset handle on a `Normal → Exceeded` transition,
    /// `None` otherwise.
    pub fn handle_scroll(
        &mut self,
        geometry: &ScrollGeometry,
    ) -> Option<(ThresholdEvent, ResetHandle)> {
        let evaluation = evaluate(
            geometry,
            self.axis,
            &self.rule,
            self.state(),
            self.last_offset,
        );
        self.last_offset = evaluation.last_offset;

        let Outcome::Exceeded {
            resolved_threshold,
            metrics,
        } = evaluation.outcome
        else {
            return None;
        };

        let arming = self.arming.get();
        if arming.state == DetectorState::Exceeded {
            return None;
        }
        let generation = arming.generation.wrapping_add(1);
        self.arming.set(Arming {
            state: DetectorState::Exceeded,
            generation,
        });
        log::debug!(
            "{:?} threshold {resolved_threshold} exceeded at offset {} of {}",
            self.axis,
            metrics.effective_offset,
            metrics.scrollable_extent
        );

        let event = ThresholdEvent {
            axis: self.axis,
            rule: self.rule,
            resolved_threshold,
            metrics,
        };
        let handle = ResetHandle {
            arming: Rc::downgrade(&self.arming),
            generation,
        };
        Some((event, handle))
    }

    /// Re-arms the detector regardless of outstanding reset handles.
    ///
    /// Handles issued before this call become stale.
    pub fn reset(&mut self) {
        let arming = self.arming.get();
        log::debug!("{:?} detector reset externally", self.axis);
        self.arming.set(Arming {
            state: DetectorState::Normal,
            generation: arming.generation.wrapping_add(1),
        });
    }
}

/// One-shot capability to re-arm the detector that produced it.
///
/// The handle holds the detector weakly and may be used arbitrarily later, for
/// example after loading more content. It only has an effect while the detector
/// is still in the [`DetectorState::Exceeded`] state it put there; once the
/// detector has been reset (or has fired again) by other means the handle is
/// stale and [`reset`](Self::reset) does nothing. Dropping the handle is the
/// same as `reset(false)`.
#[derive(Debug)]
#[must_use = "dropping a reset handle leaves the detector exceeded"]
pub struct ResetHandle {
    arming: Weak<Cell<Arming>>,
    generation: u64,
}

impl ResetHandle {
    /// Re-arms the detector when `should_reset` is `true`.
    pub fn reset(self, should_reset: bool) {
        if !should_reset || self.is_stale() {
            return;
        }
        if let Some(arming) = self.arming.upgrade() {
            log::debug!("detector re-armed by reset handle");
            arming.set(Arming {
                state: DetectorState::Normal,
                generation: self.generation.wrapping_add(1),
            });
        }
    }

    /// Returns `true` if resetting through this handle would have no effect.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.arming.upgrade().is_none_or(|arming| {
            let arming = arming.get();
            arming.state != DetectorState::Exceeded || arming.generation != self.generation
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DetectorState, Outcome, ThresholdDetector, evaluate};
    use crate::geometry::{Axis, ScrollGeometry};
    use crate::rule::ThresholdRule;
    use alloc::vec::Vec;
    use kurbo::{Insets, Point, Size};

    /// Vertical page whose scrollable extent is 1000.
    fn tall_page(offset: f64) -> ScrollGeometry {
        ScrollGeometry::new(
            Point::new(0.0, offset),
            Size::new(320.0, 200.0),
            Size::new(320.0, 1200.0),
        )
    }

    fn fires(detector: &mut ThresholdDetector, offsets: &[f64]) -> Vec<f64> {
        offsets
            .iter()
            .filter_map(|&y| detector.handle_scroll(&tall_page(y)).map(|_| y))
            .collect()
    }

    #[test]
    fn fires_once_per_approach() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.6));
        let fired = fires(&mut detector, &[100.0, 650.0, 700.0, 800.0, 990.0]);
        assert_eq!(fired, [650.0]);
        assert!(detector.is_exceeded());
    }

    #[test]
    fn percentage_boundary_is_strict() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.6));
        assert!(detector.handle_scroll(&tall_page(599.0)).is_none());
        assert!(detector.handle_scroll(&tall_page(600.0)).is_none());
        assert!(detector.handle_scroll(&tall_page(601.0)).is_some());
    }

    #[test]
    fn viewport_sentinel_fires_within_one_viewport_of_the_end() {
        let page = |y| {
            ScrollGeometry::new(
                Point::new(0.0, y),
                Size::new(320.0, 400.0),
                Size::new(320.0, 2000.0),
            )
        };
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::viewport_extent());

        // Scrollable extent is 1600; 401 remaining.
        assert!(detector.handle_scroll(&page(1199.0)).is_none());
        // 399 remaining.
        let (event, _reset) = detector.handle_scroll(&page(1201.0)).expect("within 400");
        assert_eq!(event.resolved_threshold, 400.0);
        assert_eq!(event.rule, ThresholdRule::viewport_extent());
        assert_eq!(event.metrics.remaining(), 399.0);
    }

    #[test]
    fn reset_true_rearms() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let (_, reset) = detector.handle_scroll(&tall_page(600.0)).expect("past half");
        reset.reset(true);
        assert_eq!(detector.state(), DetectorState::Normal);
        assert!(detector.handle_scroll(&tall_page(610.0)).is_some());
    }

    #[test]
    fn reset_false_or_dropped_stays_exceeded() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let (_, reset) = detector.handle_scroll(&tall_page(600.0)).expect("past half");
        reset.reset(false);
        assert!(fires(&mut detector, &[700.0, 800.0, 900.0]).is_empty());

        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        drop(detector.handle_scroll(&tall_page(600.0)));
        assert!(fires(&mut detector, &[700.0, 800.0, 900.0]).is_empty());
        assert!(detector.is_exceeded());
    }

    #[test]
    fn late_reset_after_more_scrolling() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let (_, reset) = detector.handle_scroll(&tall_page(600.0)).expect("past half");
        assert!(fires(&mut detector, &[650.0, 700.0]).is_empty());
        assert_eq!(detector.last_offset(), 700.0);

        reset.reset(true);
        assert_eq!(fires(&mut detector, &[720.0]), [720.0]);
    }

    #[test]
    fn stale_handle_cannot_undo_a_newer_firing() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let (_, first) = detector.handle_scroll(&tall_page(600.0)).expect("past half");

        detector.reset();
        assert!(first.is_stale());
        let (_, second) = detector.handle_scroll(&tall_page(650.0)).expect("re-armed");

        first.reset(true);
        assert!(detector.is_exceeded(), "stale handle must not re-arm");
        assert!(!second.is_stale());
        second.reset(true);
        assert!(!detector.is_exceeded());
    }

    #[test]
    fn handle_outliving_detector_is_inert() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let (_, reset) = detector.handle_scroll(&tall_page(600.0)).expect("past half");
        drop(detector);
        assert!(reset.is_stale());
        reset.reset(true);
    }

    #[test]
    fn backward_scroll_never_fires() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        assert!(detector.handle_scroll(&tall_page(400.0)).is_none());
        assert!(detector.handle_scroll(&tall_page(900.0)).is_some());
        detector.reset();

        // 800 is past half but behind the last offset.
        assert!(detector.handle_scroll(&tall_page(800.0)).is_none());
        assert_eq!(detector.last_offset(), 800.0);
        // Moving forward from the new position fires again.
        assert!(detector.handle_scroll(&tall_page(801.0)).is_some());
    }

    #[test]
    fn backward_guard_uses_effective_offset() {
        let insets = Insets::new(0.0, 50.0, 0.0, 0.0);
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.9));
        assert!(detector.handle_scroll(&tall_page(100.0).with_insets(insets)).is_none());
        assert_eq!(detector.last_offset(), 150.0);

        let evaluation = evaluate(
            &tall_page(120.0),
            Axis::Vertical,
            &ThresholdRule::percentage(0.0),
            DetectorState::Normal,
            detector.last_offset(),
        );
        assert_eq!(evaluation.outcome, Outcome::Unchanged);
        assert_eq!(evaluation.last_offset, 120.0);
    }

    #[test]
    fn axes_are_interchangeable() {
        let vertical = tall_page;
        let horizontal = |x| {
            ScrollGeometry::new(
                Point::new(x, 0.0),
                Size::new(200.0, 320.0),
                Size::new(1200.0, 320.0),
            )
        };
        let offsets = [100.0, 300.0, 250.0, 700.0, 750.0, 960.0];
        for rule in [
            ThresholdRule::percentage(0.6),
            ThresholdRule::fixed_distance(50.0),
            ThresholdRule::viewport_extent(),
        ] {
            let mut v = ThresholdDetector::new(Axis::Vertical, rule);
            let mut h = ThresholdDetector::new(Axis::Horizontal, rule);
            for &offset in &offsets {
                let a = v.handle_scroll(&vertical(offset)).map(|(e, _)| e.metrics);
                let b = h.handle_scroll(&horizontal(offset)).map(|(e, _)| e.metrics);
                assert_eq!(a, b, "{rule:?} diverged at {offset}");
            }
        }
    }

    #[test]
    fn cross_axis_geometry_is_ignored() {
        let mut detector = ThresholdDetector::new(Axis::Horizontal, ThresholdRule::percentage(0.5));
        // Far down vertically, at the start horizontally.
        assert!(detector.handle_scroll(&tall_page(1000.0)).is_none());
    }

    #[test]
    fn zero_content_extent_is_gated() {
        let empty = ScrollGeometry::new(Point::new(0.0, 10.0), Size::new(320.0, 480.0), Size::ZERO);
        let evaluation = evaluate(
            &empty,
            Axis::Vertical,
            &ThresholdRule::percentage(0.0),
            DetectorState::Normal,
            0.0,
        );
        assert!(!evaluation.is_exceeded());
        assert_eq!(evaluation.last_offset, 10.0);
    }

    #[test]
    fn exceeded_state_gates_evaluation() {
        let evaluation = evaluate(
            &tall_page(900.0),
            Axis::Vertical,
            &ThresholdRule::percentage(0.5),
            DetectorState::Exceeded,
            0.0,
        );
        assert_eq!(evaluation.outcome, Outcome::Unchanged);
        assert_eq!(evaluation.last_offset, 900.0);
    }

    #[test]
    fn replacing_the_rule_keeps_state() {
        let mut detector = ThresholdDetector::new(Axis::Vertical, ThresholdRule::percentage(0.5));
        let _ = detector.handle_scroll(&tall_page(600.0)).expect("past half");
        detector.set_rule(ThresholdRule::fixed_distance(10.0));
        assert!(detector.is_exceeded());
        assert_eq!(detector.rule(), ThresholdRule::FixedDistance(10.0));
        assert_eq!(detector.axis(), Axis::Vertical);
    }
}
