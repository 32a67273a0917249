use crate::observer::ObserverId;
use crate::page::Page;
use html::NodeId;

/// Browser signals delivered to listeners, one at a time, in queue order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The text of an input control changed; `value` is its full new value.
    Input { target: NodeId, value: String },
    /// The window scroll offset changed; read it from [`Page::scroll_y`].
    Scroll,
    Click { target: NodeId },
    /// `key` follows `KeyboardEvent.key` naming (`"Escape"`, `"a"`).
    KeyDown { key: String },
    PointerMove { x: f64, y: f64 },
    Intersection(IntersectionEntry),
    /// An animation frame; `now_ms` is the page clock.
    Frame { now_ms: f64 },
}

impl PageEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PageEvent::Input { .. } => "input",
            PageEvent::Scroll => "scroll",
            PageEvent::Click { .. } => "click",
            PageEvent::KeyDown { .. } => "keydown",
            PageEvent::PointerMove { .. } => "pointermove",
            PageEvent::Intersection(_) => "intersection",
            PageEvent::Frame { .. } => "frame",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub observer: ObserverId,
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// A feature controller attached to a page.
pub trait Listener {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn handle(&mut self, page: &mut Page, event: &PageEvent);
}

/// What happened to one dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub event: PageEvent,
    pub default_prevented: bool,
}
