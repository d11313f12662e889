// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scroll observer that watches for the pagination threshold while standing in
//! for whatever observer the host already had.
//!
//! [`ScrollObserverProxy::attach`] captures the host's current observer, installs
//! the proxy in its place, and from then on:
//!
//! - forwards every hook to the captured observer, so it keeps seeing exactly
//!   what it saw before;
//! - on [`did_scroll`](ScrollObserver::did_scroll), forwards first and then runs
//!   threshold detection, calling the threshold callback on a fresh crossing;
//! - reports the captured observer's [`ObserverCapabilities`] plus
//!   [`ObserverCapabilities::DID_SCROLL`].
//!
//! Hosts that already route their own scroll events can skip installation and use
//! [`ScrollObserverProxy::new`] with [`ScrollObserverProxy::handle_scroll`] instead.
//!
//! ## Lifetimes
//!
//! Neither the host nor the captured observer is owned by the proxy. The host holds
//! the proxy weakly, so the caller keeps the [`Rc`] returned by `attach` alive for as
//! long as pagination should run. If the captured observer is dropped first,
//! forwarding quietly stops.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::{Point, Vec2};

use crate::detector::{ResetHandle, ThresholdDetector, ThresholdEvent};
use crate::geometry::{Axis, ScrollGeometry};
use crate::observer::{ObserverCapabilities, ScrollHost, ScrollObserver, WeakObserver};
use crate::rule::ThresholdRule;

/// Called once per threshold crossing.
///
/// The callback decides when to re-arm detection through the [`ResetHandle`], for
/// example after the next page has been loaded.
pub type ThresholdCallback = Box<dyn FnMut(&ThresholdEvent, ResetHandle)>;

/// Construction-time settings for a [`ScrollObserverProxy`].
///
/// The default measures vertically and fires within one viewport of the end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PaginationConfig {
    /// Axis to measure along.
    pub axis: Axis,
    /// Rule to detect.
    pub rule: ThresholdRule,
}

impl PaginationConfig {
    /// Fire once more than `fraction` of the scrollable extent has been scrolled.
    #[must_use]
    pub const fn percentage(axis: Axis, fraction: f64) -> Self {
        Self {
            axis,
            rule: ThresholdRule::Percentage(fraction),
        }
    }

    /// Fire once less than `distance` remains until the end of the content.
    #[must_use]
    pub const fn fixed_distance(axis: Axis, distance: f64) -> Self {
        Self {
            axis,
            rule: ThresholdRule::FixedDistance(distance),
        }
    }

    /// Returns the config with `axis` replaced.
    #[must_use]
    pub const fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Returns the config with `rule` replaced.
    #[must_use]
    pub const fn with_rule(mut self, rule: ThresholdRule) -> Self {
        self.rule = rule;
        self
    }
}

/// How scroll events reach a [`ScrollObserverProxy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachMode {
    /// Installed as the host's observer by [`ScrollObserverProxy::attach`].
    Auto,
    /// Created by [`ScrollObserverProxy::new`]; the caller forwards events.
    Manual,
}

/// Threshold detection layered over a host's existing scroll observer.
pub struct ScrollObserverProxy {
    detector: ThresholdDetector,
    original: Option<WeakObserver>,
    original_capabilities: ObserverCapabilities,
    on_threshold: Option<ThresholdCallback>,
    mode: AttachMode,
}

impl fmt::Debug for ScrollObserverProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollObserverProxy")
            .field("detector", &self.detector)
            .field("has_original", &self.original.is_some())
            .field("has_callback", &self.on_threshold.is_some())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ScrollObserverProxy {
    /// Creates a proxy that is not installed anywhere.
    ///
    /// Feed it events with [`handle_scroll`](Self::handle_scroll) (or any
    /// [`ScrollObserver`] hook) from the host's own dispatch.
    #[must_use]
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            detector: ThresholdDetector::new(config.axis, config.rule),
            original: None,
            original_capabilities: ObserverCapabilities::empty(),
            on_threshold: None,
            mode: AttachMode::Manual,
        }
    }

    /// Installs a new proxy as `host`'s observer, capturing the previous one.
    ///
    /// The host only holds the proxy weakly: keep the returned [`Rc`] alive.
    pub fn attach<H: ScrollHost + ?Sized>(
        host: &mut H,
        config: PaginationConfig,
    ) -> Rc<RefCell<Self>> {
        let original = host.observer();
        let original_capabilities = original
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|observer| observer.try_borrow().ok().map(|o| o.capabilities()))
            .unwrap_or_else(ObserverCapabilities::empty);
        log::debug!(
            "attaching {:?} pagination proxy (original observer: {})",
            config.axis,
            original.is_some()
        );
        let proxy = Rc::new(RefCell::new(Self {
            detector: ThresholdDetector::new(config.axis, config.rule),
            original,
            original_capabilities,
            on_threshold: None,
            mode: AttachMode::Auto,
        }));
        let observer: Weak<RefCell<Self>> = Rc::downgrade(&proxy);
        host.set_observer(Some(observer));
        proxy
    }

    /// Puts the captured observer back on `host`.
    ///
    /// Does nothing and returns `false` if `host` is no longer observed by `proxy`,
    /// or if `proxy` is currently borrowed (for example from inside its own
    /// threshold callback).
    pub fn detach<H: ScrollHost + ?Sized>(proxy: &Rc<RefCell<Self>>, host: &mut H) -> bool {
        let installed = host
            .observer()
            .is_some_and(|current| core::ptr::addr_eq(current.as_ptr(), Rc::as_ptr(proxy)));
        if !installed {
            return false;
        }
        let Ok(this) = proxy.try_borrow() else {
            return false;
        };
        host.set_observer(this.original.clone());
        log::debug!("detached {:?} pagination proxy", this.detector.axis());
        true
    }

    /// Sets the callback invoked on each threshold crossing.
    pub fn set_on_threshold(
        &mut self,
        callback: impl FnMut(&ThresholdEvent, ResetHandle) + 'static,
    ) {
        self.on_threshold = Some(Box::new(callback));
    }

    /// Removes the threshold callback.
    ///
    /// Crossings still move the detector to its exceeded state; with nobody to
    /// reset it, it stays there until [`ThresholdDetector::reset`].
    pub fn clear_on_threshold(&mut self) {
        self.on_threshold = None;
    }

    /// The underlying detector.
    #[must_use]
    pub const fn detector(&self) -> &ThresholdDetector {
        &self.detector
    }

    /// The underlying detector, for changing the rule or resetting.
    pub fn detector_mut(&mut self) -> &mut ThresholdDetector {
        &mut self.detector
    }

    /// The observer captured at attach time, if any.
    #[must_use]
    pub fn original_observer(&self) -> Option<&WeakObserver> {
        self.original.as_ref()
    }

    /// How this proxy receives events.
    #[must_use]
    pub const fn attach_mode(&self) -> AttachMode {
        self.mode
    }

    /// Runs detection for one scroll event, without forwarding.
    ///
    /// Returns `true` if the threshold was newly crossed.
    pub fn handle_scroll(&mut self, geometry: &ScrollGeometry) -> bool {
        let Some((event, reset)) = self.detector.handle_scroll(geometry) else {
            return false;
        };
        match self.on_threshold.as_mut() {
            Some(callback) => callback(&event, reset),
            None => log::debug!("threshold crossed with no callback set"),
        }
        true
    }

    fn forward<R>(
        &self,
        hook: &'static str,
        call: impl FnOnce(&mut dyn ScrollObserver) -> R,
    ) -> Option<R> {
        let original = self.original.as_ref().and_then(Weak::upgrade)?;
        let Ok(mut observer) = original.try_borrow_mut() else {
            log::warn!("original observer is busy, not forwarding {hook}");
            return None;
        };
        Some(call(&mut *observer))
    }
}

impl ScrollObserver for ScrollObserverProxy {
    fn capabilities(&self) -> ObserverCapabilities {
        let Some(original) = self.original.as_ref().and_then(Weak::upgrade) else {
            return ObserverCapabilities::DID_SCROLL;
        };
        let forwarded = match original.try_borrow() {
            Ok(observer) => observer.capabilities(),
            Err(_) => {
                log::warn!("original observer is busy, reporting capabilities seen at attach");
                self.original_capabilities
            }
        };
        forwarded | ObserverCapabilities::DID_SCROLL
    }

    fn did_scroll(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_scroll", |o| o.did_scroll(geometry));
        self.handle_scroll(geometry);
    }

    fn did_zoom(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_zoom", |o| o.did_zoom(geometry));
    }

    fn will_begin_dragging(&mut self, geometry: &ScrollGeometry) {
        self.forward("will_begin_dragging", |o| o.will_begin_dragging(geometry));
    }

    fn will_end_dragging(
        &mut self,
        geometry: &ScrollGeometry,
        velocity: Vec2,
        target_offset: &mut Point,
    ) {
        self.forward("will_end_dragging", |o| {
            o.will_end_dragging(geometry, velocity, target_offset);
        });
    }

    fn did_end_dragging(&mut self, geometry: &ScrollGeometry, will_decelerate: bool) {
        self.forward("did_end_dragging", |o| {
            o.did_end_dragging(geometry, will_decelerate);
        });
    }

    fn will_begin_decelerating(&mut self, geometry: &ScrollGeometry) {
        self.forward("will_begin_decelerating", |o| {
            o.will_begin_decelerating(geometry);
        });
    }

    fn did_end_decelerating(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_end_decelerating", |o| o.did_end_decelerating(geometry));
    }

    fn did_end_scrolling_animation(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_end_scrolling_animation", |o| {
            o.did_end_scrolling_animation(geometry);
        });
    }

    fn will_begin_zooming(&mut self, geometry: &ScrollGeometry) {
        self.forward("will_begin_zooming", |o| o.will_begin_zooming(geometry));
    }

    fn did_end_zooming(&mut self, geometry: &ScrollGeometry, scale: f64) {
        self.forward("did_end_zooming", |o| o.did_end_zooming(geometry, scale));
    }

    fn should_scroll_to_top(&mut self, geometry: &ScrollGeometry) -> bool {
        self.forward("should_scroll_to_top", |o| o.should_scroll_to_top(geometry))
            .unwrap_or(true)
    }

    fn did_scroll_to_top(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_scroll_to_top", |o| o.did_scroll_to_top(geometry));
    }

    fn did_change_adjusted_content_inset(&mut self, geometry: &ScrollGeometry) {
        self.forward("did_change_adjusted_content_inset", |o| {
            o.did_change_adjusted_content_inset(geometry);
        });
    }
}
