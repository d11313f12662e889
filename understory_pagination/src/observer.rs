// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll observer contract between a hosting view and whoever listens to it.
//!
//! A host (the scrollable view) keeps at most one observer and calls the
//! [`ScrollObserver`] hooks on it as the user interacts. Every hook has a no-op
//! default, so observers only implement what they care about and advertise it
//! through [`ScrollObserver::capabilities`]. Hosts may use the advertised set to skip
//! work for hooks nobody listens to.
//!
//! Hosts hold their observer weakly ([`WeakObserver`]); the observer's owner (a
//! screen, a controller) decides how long it lives.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use kurbo::{Point, Vec2};

use crate::geometry::ScrollGeometry;

bitflags::bitflags! {
    /// The hooks of [`ScrollObserver`] an observer actually implements.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObserverCapabilities: u16 {
        /// [`ScrollObserver::did_scroll`].
        const DID_SCROLL                   = 1 << 0;
        /// [`ScrollObserver::did_zoom`].
        const DID_ZOOM                     = 1 << 1;
        /// [`ScrollObserver::will_begin_dragging`].
        const WILL_BEGIN_DRAGGING          = 1 << 2;
        /// [`ScrollObserver::will_end_dragging`].
        const WILL_END_DRAGGING            = 1 << 3;
        /// [`ScrollObserver::did_end_dragging`].
        const DID_END_DRAGGING             = 1 << 4;
        /// [`ScrollObserver::will_begin_decelerating`].
        const WILL_BEGIN_DECELERATING      = 1 << 5;
        /// [`ScrollObserver::did_end_decelerating`].
        const DID_END_DECELERATING         = 1 << 6;
        /// [`ScrollObserver::did_end_scrolling_animation`].
        const DID_END_SCROLLING_ANIMATION  = 1 << 7;
        /// [`ScrollObserver::will_begin_zooming`].
        const WILL_BEGIN_ZOOMING           = 1 << 8;
        /// [`ScrollObserver::did_end_zooming`].
        const DID_END_ZOOMING              = 1 << 9;
        /// [`ScrollObserver::should_scroll_to_top`].
        const SHOULD_SCROLL_TO_TOP         = 1 << 10;
        /// [`ScrollObserver::did_scroll_to_top`].
        const DID_SCROLL_TO_TOP            = 1 << 11;
        /// [`ScrollObserver::did_change_adjusted_content_inset`].
        const DID_CHANGE_ADJUSTED_INSET    = 1 << 12;
    }
}

impl Default for ObserverCapabilities {
    fn default() -> Self {
        Self::empty()
    }
}

/// Listener for a scrollable view.
///
/// Every hook receives the view's current geometry. Hooks default to doing
/// nothing; [`should_scroll_to_top`](Self::should_scroll_to_top) defaults to
/// allowing the scroll.
pub trait ScrollObserver {
    /// Hooks this observer implements.
    fn capabilities(&self) -> ObserverCapabilities {
        ObserverCapabilities::empty()
    }

    /// The scroll position changed.
    fn did_scroll(&mut self, _geometry: &ScrollGeometry) {}

    /// The zoom scale changed.
    fn did_zoom(&mut self, _geometry: &ScrollGeometry) {}

    /// The user started dragging the content.
    fn will_begin_dragging(&mut self, _geometry: &ScrollGeometry) {}

    /// The user is about to lift their finger.
    ///
    /// `target_offset` is where the content will come to rest and may be adjusted.
    fn will_end_dragging(
        &mut self,
        _geometry: &ScrollGeometry,
        _velocity: Vec2,
        _target_offset: &mut Point,
    ) {
    }

    /// The user stopped dragging.
    fn did_end_dragging(&mut self, _geometry: &ScrollGeometry, _will_decelerate: bool) {}

    /// The content started decelerating after a drag.
    fn will_begin_decelerating(&mut self, _geometry: &ScrollGeometry) {}

    /// The content came to rest.
    fn did_end_decelerating(&mut self, _geometry: &ScrollGeometry) {}

    /// A programmatic scroll animation finished.
    fn did_end_scrolling_animation(&mut self, _geometry: &ScrollGeometry) {}

    /// A pinch started.
    fn will_begin_zooming(&mut self, _geometry: &ScrollGeometry) {}

    /// A pinch finished at `scale`.
    fn did_end_zooming(&mut self, _geometry: &ScrollGeometry, _scale: f64) {}

    /// Whether a scroll-to-top gesture may proceed.
    fn should_scroll_to_top(&mut self, _geometry: &ScrollGeometry) -> bool {
        true
    }

    /// A scroll-to-top gesture finished.
    fn did_scroll_to_top(&mut self, _geometry: &ScrollGeometry) {}

    /// The host's adjusted content insets changed.
    fn did_change_adjusted_content_inset(&mut self, _geometry: &ScrollGeometry) {}
}

/// An observer shared between its owner and interested parties.
pub type SharedObserver = Rc<RefCell<dyn ScrollObserver>>;

/// A non-owning reference to an observer, as held by hosts.
pub type WeakObserver = Weak<RefCell<dyn ScrollObserver>>;

/// A scrollable view that reports to a single observer.
pub trait ScrollHost {
    /// The currently attached observer, if any.
    fn observer(&self) -> Option<WeakObserver>;

    /// Replaces the attached observer.
    fn set_observer(&mut self, observer: Option<WeakObserver>);
}

#[cfg(test)]
mod tests {
    use super::{ObserverCapabilities, ScrollObserver};
    use crate::geometry::ScrollGeometry;
    use kurbo::{Point, Vec2};

    struct Silent;

    impl ScrollObserver for Silent {}

    #[test]
    fn defaults_are_inert() {
        let mut observer = Silent;
        let geometry = ScrollGeometry::default();
        let mut target = Point::new(0.0, 40.0);

        assert_eq!(observer.capabilities(), ObserverCapabilities::empty());
        observer.will_end_dragging(&geometry, Vec2::new(0.0, 2.0), &mut target);
        assert_eq!(target, Point::new(0.0, 40.0));
        assert!(observer.should_scroll_to_top(&geometry));
        assert_eq!(ObserverCapabilities::default(), ObserverCapabilities::empty());
    }
}
