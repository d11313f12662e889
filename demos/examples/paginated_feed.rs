// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Infinite feed: load another page whenever the user nears the end.
//!
//! This example shows how to combine:
//! - a host view that reports scrolls to a single, weakly held observer,
//! - an existing screen-level observer that must keep working unchanged,
//! - `ScrollObserverProxy` to detect the threshold and defer a page load,
//!   re-arming detection through the `ResetHandle` once the page has landed.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example paginated_feed`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use kurbo::{Point, Size};
use understory_pagination::{
    Axis, ObserverCapabilities, PaginationConfig, ResetHandle, ScrollGeometry, ScrollHost,
    ScrollObserver, ScrollObserverProxy, SharedObserver, WeakObserver,
};

const ROW_HEIGHT: f64 = 44.0;
const PAGE_SIZE: usize = 20;
/// Scroll steps a page load takes to "arrive".
const LOAD_LATENCY: u32 = 3;

/// A vertical list that tells one observer about scrolls.
struct FeedView {
    rows: Vec<String>,
    offset: f64,
    viewport: Size,
    observer: Option<WeakObserver>,
}

impl FeedView {
    fn new(viewport: Size) -> Self {
        Self {
            rows: Vec::new(),
            offset: 0.0,
            viewport,
            observer: None,
        }
    }

    fn geometry(&self) -> ScrollGeometry {
        let content_height = self.rows.len() as f64 * ROW_HEIGHT;
        ScrollGeometry::new(
            Point::new(0.0, self.offset),
            self.viewport,
            Size::new(self.viewport.width, content_height),
        )
    }

    fn scroll_by(&mut self, delta: f64) {
        let geometry = self.geometry();
        let max = (geometry.content_size.height - self.viewport.height).max(0.0);
        self.offset = (self.offset + delta).clamp(0.0, max);

        let geometry = self.geometry();
        if let Some(observer) = self.observer.as_ref().and_then(|o| o.upgrade()) {
            observer.borrow_mut().did_scroll(&geometry);
        }
    }

    fn append_page(&mut self) {
        let start = self.rows.len();
        self.rows
            .extend((start..start + PAGE_SIZE).map(|i| format!("row {i}")));
    }
}

impl ScrollHost for FeedView {
    fn observer(&self) -> Option<WeakObserver> {
        self.observer.clone()
    }

    fn set_observer(&mut self, observer: Option<WeakObserver>) {
        self.observer = observer;
    }
}

/// The screen's own observer, which existed before pagination was added.
#[derive(Default)]
struct ScreenObserver {
    scrolls: usize,
}

impl ScrollObserver for ScreenObserver {
    fn capabilities(&self) -> ObserverCapabilities {
        ObserverCapabilities::DID_SCROLL
    }

    fn did_scroll(&mut self, geometry: &ScrollGeometry) {
        self.scrolls += 1;
        log::trace!("screen saw scroll to {}", geometry.content_offset.y);
    }
}

/// A page load in flight.
struct PendingLoad {
    remaining: u32,
    reset: ResetHandle,
}

fn main() {
    env_logger::init();

    let mut view = FeedView::new(Size::new(320.0, 480.0));
    view.append_page();

    let screen = Rc::new(RefCell::new(ScreenObserver::default()));
    let shared: SharedObserver = screen.clone();
    view.set_observer(Some(Rc::downgrade(&shared)));

    let config = PaginationConfig::percentage(Axis::Vertical, 0.7);
    let proxy = ScrollObserverProxy::attach(&mut view, config);
    let loads: Rc<RefCell<VecDeque<PendingLoad>>> = Rc::default();
    {
        let loads = loads.clone();
        proxy.borrow_mut().set_on_threshold(move |event, reset| {
            log::info!(
                "threshold {} crossed at {:.0}/{:.0}, loading next page",
                event.resolved_threshold,
                event.metrics.effective_offset,
                event.metrics.scrollable_extent
            );
            loads.borrow_mut().push_back(PendingLoad {
                remaining: LOAD_LATENCY,
                reset,
            });
        });
    }

    for _ in 0..120 {
        view.scroll_by(ROW_HEIGHT / 2.0);

        let arrived: Vec<PendingLoad> = {
            let mut loads = loads.borrow_mut();
            for load in loads.iter_mut() {
                load.remaining = load.remaining.saturating_sub(1);
            }
            let ready = loads.iter().take_while(|load| load.remaining == 0).count();
            loads.drain(..ready).collect()
        };
        for load in arrived {
            view.append_page();
            load.reset.reset(true);
        }
    }

    println!(
        "{} rows loaded, offset {:.0}, screen observer saw {} scrolls",
        view.rows.len(),
        view.offset,
        screen.borrow().scrolls
    );
    println!("last row: {}", view.rows.last().map_or("<none>", String::as_str));
    println!("proxy capabilities: {:?}", proxy.borrow().capabilities());
}
