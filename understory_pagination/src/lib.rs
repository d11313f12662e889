// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pagination --heading-base-level=0

//! Understory Pagination: notice when a scroll view nears the end of its content.
//!
//! Infinite lists and feeds load the next page when the user gets close to the end
//! of what is already there. This crate answers "are we close yet?" exactly once
//! per approach, and stays out of the way of anything else listening to the same
//! scroll view.
//!
//! The pieces:
//!
//! - [`ScrollGeometry`] and [`Axis`]: a per-event snapshot of offsets, sizes and
//!   insets, normalized along one axis into [`NormalizedMetrics`].
//! - [`ThresholdRule`]: fire past a [`Percentage`](ThresholdRule::Percentage) of the
//!   scrollable extent, or within a [`FixedDistance`](ThresholdRule::FixedDistance)
//!   of the end (by default, one viewport).
//! - [`ThresholdDetector`]: a two-state machine around the pure [`evaluate`] step.
//!   A crossing yields a [`ThresholdEvent`] and a one-shot [`ResetHandle`]; nothing
//!   fires again until the handle (or [`ThresholdDetector::reset`]) re-arms it.
//! - [`ScrollObserverProxy`]: a [`ScrollObserver`] that takes the place of a
//!   [`ScrollHost`]'s existing observer, forwards every hook to it, and runs
//!   detection after forwarding each scroll.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Size};
//! use understory_pagination::{
//!     Axis, PaginationConfig, ScrollGeometry, ScrollHost, ScrollObserver, ScrollObserverProxy,
//!     WeakObserver,
//! };
//!
//! #[derive(Default)]
//! struct ListView {
//!     observer: Option<WeakObserver>,
//! }
//!
//! impl ScrollHost for ListView {
//!     fn observer(&self) -> Option<WeakObserver> {
//!         self.observer.clone()
//!     }
//!     fn set_observer(&mut self, observer: Option<WeakObserver>) {
//!         self.observer = observer;
//!     }
//! }
//!
//! let mut view = ListView::default();
//! let config = PaginationConfig::percentage(Axis::Vertical, 0.8);
//! let proxy = ScrollObserverProxy::attach(&mut view, config);
//!
//! let pages = Rc::new(RefCell::new(1));
//! let counter = pages.clone();
//! proxy.borrow_mut().set_on_threshold(move |_event, reset| {
//!     *counter.borrow_mut() += 1;
//!     // Re-arm once the next page is in place.
//!     reset.reset(true);
//! });
//!
//! // The host reports a scroll to 90% of the way down.
//! let geometry = ScrollGeometry::new(
//!     Point::new(0.0, 900.0),
//!     Size::new(320.0, 480.0),
//!     Size::new(320.0, 1480.0),
//! );
//! if let Some(observer) = view.observer().and_then(|o| o.upgrade()) {
//!     observer.borrow_mut().did_scroll(&geometry);
//! }
//! assert_eq!(*pages.borrow(), 2);
//! ```
//!
//! Everything here runs synchronously on the thread that delivers scroll events.
//! Reset handles may be used later, from whatever deferred work the callback
//! schedules.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod detector;
mod geometry;
mod observer;
mod proxy;
mod rule;

pub use detector::{
    DetectorState, Evaluation, Outcome, ResetHandle, ThresholdDetector, ThresholdEvent, evaluate,
};
pub use geometry::{Axis, NormalizedMetrics, ScrollGeometry};
pub use observer::{ObserverCapabilities, ScrollHost, ScrollObserver, SharedObserver, WeakObserver};
pub use proxy::{AttachMode, PaginationConfig, ScrollObserverProxy, ThresholdCallback};
pub use rule::ThresholdRule;
