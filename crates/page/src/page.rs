use crate::error::PageError;
use crate::event::{DispatchRecord, IntersectionEntry, Listener, PageEvent};
use crate::geometry::{ColorScheme, LayoutBox, ScrollBehavior, ScrollRequest, Viewport};
use crate::observer::{ObserverId, ObserverOptions, ObserverRegistry};
use crate::storage::{MemoryStorage, Storage};
use html::{Document, NodeId, parse_document};
use std::collections::{HashMap, VecDeque};

/// Upper bound on events handled by one `run_until_idle` call. Listeners that keep re-queueing
/// (a scroll handler that scrolls) would otherwise spin forever.
const MAX_EVENTS_PER_RUN: usize = 10_000;

/// Dispatch records kept by [`Page::history`]; older records are dropped first.
pub const HISTORY_LIMIT: usize = 256;

/// Scroll requests kept by [`Page::scroll_requests`].
pub const SCROLL_REQUEST_LIMIT: usize = 32;

fn push_bounded<T>(buf: &mut VecDeque<T>, limit: usize, item: T) {
    if buf.len() == limit {
        buf.pop_front();
    }
    buf.push_back(item);
}

#[derive(Debug, Default)]
struct ScrollLock {
    depth: u32,
    saved_overflow: Option<String>,
}

/// The browser side of a loaded page.
///
/// Owns the document, the window geometry, local storage and a single FIFO event queue.
/// Listeners receive events one by one and may queue more (programmatic scrolls, intersection
/// changes); those run after the current event finishes.
pub struct Page {
    document: Document,
    viewport: Viewport,
    layout: HashMap<NodeId, LayoutBox>,
    storage: Box<dyn Storage>,
    color_scheme: ColorScheme,
    queue: VecDeque<PageEvent>,
    observers: ObserverRegistry,
    scroll_requests: VecDeque<ScrollRequest>,
    scroll_lock: ScrollLock,
    now_ms: f64,
    default_prevented: bool,
    history: VecDeque<DispatchRecord>,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            viewport: Viewport::default(),
            layout: HashMap::new(),
            storage: Box::new(MemoryStorage::new()),
            color_scheme: ColorScheme::default(),
            queue: VecDeque::new(),
            observers: ObserverRegistry::default(),
            scroll_requests: VecDeque::new(),
            scroll_lock: ScrollLock::default(),
            now_ms: 0.0,
            default_prevented: false,
            history: VecDeque::new(),
        }
    }

    pub fn from_html(input: &str) -> Self {
        Self::new(parse_document(input))
    }

    pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self.viewport.scroll_y = self.viewport.clamp_scroll(viewport.scroll_y);
        self
    }

    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    /// The `prefers-color-scheme` media query result.
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    // ---- geometry -----------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    pub fn set_layout_box(&mut self, node: NodeId, layout: LayoutBox) {
        self.layout.insert(node, layout);
        self.refresh_intersections();
    }

    /// Assigns `layout` to every element matching `selector`. Returns how many matched.
    pub fn set_layout_for(&mut self, selector: &str, layout: LayoutBox) -> Result<usize, PageError> {
        let nodes = self.document.select(selector)?;
        if nodes.is_empty() {
            return Err(PageError::NoMatch(selector.to_string()));
        }
        for node in &nodes {
            self.layout.insert(*node, layout);
        }
        self.refresh_intersections();
        Ok(nodes.len())
    }

    pub fn layout_box(&self, node: NodeId) -> Option<LayoutBox> {
        self.layout.get(&node).copied()
    }

    /// User scroll: moves the window and queues a `Scroll` event if the offset changed.
    pub fn scroll(&mut self, y: f64) {
        let y = self.viewport.clamp_scroll(y);
        if y == self.viewport.scroll_y {
            return;
        }
        self.viewport.scroll_y = y;
        self.queue.push_back(PageEvent::Scroll);
        self.refresh_intersections();
    }

    /// `window.scrollTo`. Smooth scrolls land immediately; the behavior is recorded.
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let top = self.viewport.clamp_scroll(top);
        log::debug!(target: "page.scroll", "scroll_to {top} ({behavior:?})");
        push_bounded(
            &mut self.scroll_requests,
            SCROLL_REQUEST_LIMIT,
            ScrollRequest { top, behavior },
        );
        self.scroll(top);
    }

    /// `element.scrollIntoView`. Returns false when the element has no layout box.
    pub fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior) -> bool {
        let Some(layout) = self.layout_box(node) else {
            return false;
        };
        self.scroll_to(layout.top, behavior);
        true
    }

    /// The most recent `scroll_to` requests, oldest first.
    pub fn scroll_requests(&self) -> &VecDeque<ScrollRequest> {
        &self.scroll_requests
    }

    /// Locks page scrolling (`body { overflow: hidden }`). Locks nest; the original
    /// overflow is restored when the last one is released.
    pub fn lock_scroll(&mut self) {
        let Some(body) = self.document.body() else {
            return;
        };
        if self.scroll_lock.depth == 0 {
            self.scroll_lock.saved_overflow =
                self.document.style(body, "overflow").map(str::to_string);
            self.document.set_style(body, "overflow", "hidden");
        }
        self.scroll_lock.depth += 1;
    }

    pub fn unlock_scroll(&mut self) {
        if self.scroll_lock.depth == 0 {
            return;
        }
        self.scroll_lock.depth -= 1;
        if self.scroll_lock.depth > 0 {
            return;
        }
        let saved = self.scroll_lock.saved_overflow.take().unwrap_or_default();
        if let Some(body) = self.document.body() {
            self.document.set_style(body, "overflow", &saved);
        }
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.depth > 0
    }

    // ---- observers ----------------------------------------------------

    pub fn create_observer(&mut self, options: ObserverOptions) -> ObserverId {
        self.observers.create(options)
    }

    /// Starts observing `target`; its initial state is queued like in browsers.
    pub fn observe(&mut self, observer: ObserverId, target: NodeId) {
        if self.observers.observe(observer, target) {
            self.refresh_intersections();
        }
    }

    pub fn unobserve(&mut self, observer: ObserverId, target: NodeId) {
        self.observers.unobserve(observer, target);
    }

    pub fn observed_count(&self, observer: ObserverId) -> usize {
        self.observers.observed_count(observer)
    }

    fn refresh_intersections(&mut self) {
        let layout = &self.layout;
        let pending = self
            .observers
            .update(&self.viewport, |id| layout.get(&id).copied());
        for entry in pending {
            self.queue.push_back(PageEvent::Intersection(IntersectionEntry {
                observer: entry.observer,
                target: entry.target,
                ratio: entry.ratio,
                is_intersecting: entry.is_intersecting,
            }));
        }
    }

    // ---- events -------------------------------------------------------

    pub fn queue_event(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn click(&mut self, target: NodeId) {
        self.queue_event(PageEvent::Click { target });
    }

    pub fn input(&mut self, target: NodeId, value: &str) {
        self.queue_event(PageEvent::Input {
            target,
            value: value.to_string(),
        });
    }

    pub fn key_down(&mut self, key: &str) {
        self.queue_event(PageEvent::KeyDown {
            key: key.to_string(),
        });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.queue_event(PageEvent::PointerMove { x, y });
    }

    /// Advances the page clock by `elapsed_ms` and queues an animation frame.
    pub fn advance_frame(&mut self, elapsed_ms: f64) {
        self.now_ms += elapsed_ms.max(0.0);
        self.queue_event(PageEvent::Frame {
            now_ms: self.now_ms,
        });
    }

    /// `event.preventDefault()` for the event currently being dispatched.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// The last [`HISTORY_LIMIT`] dispatched events, oldest first.
    pub fn history(&self) -> &VecDeque<DispatchRecord> {
        &self.history
    }

    /// Delivers queued events to `listeners` until the queue is empty. Returns the number of
    /// events dispatched.
    pub fn run_until_idle(&mut self, listeners: &mut [Box<dyn Listener>]) -> usize {
        let mut dispatched = 0;
        while let Some(event) = self.queue.pop_front() {
            if dispatched == MAX_EVENTS_PER_RUN {
                log::warn!(
                    target: "page.events",
                    "event budget exhausted; dropping {} queued events",
                    self.queue.len() + 1
                );
                self.queue.clear();
                break;
            }
            self.dispatch(event, listeners);
            dispatched += 1;
        }
        dispatched
    }

    fn dispatch(&mut self, event: PageEvent, listeners: &mut [Box<dyn Listener>]) {
        log::trace!(target: "page.events", "dispatch {event:?}");
        self.default_prevented = false;
        for listener in listeners.iter_mut() {
            listener.handle(self, &event);
        }
        let record = DispatchRecord {
            event,
            default_prevented: self.default_prevented,
        };
        push_bounded(&mut self.history, HISTORY_LIMIT, record);
    }
}
