//! # page
//!
//! The browser collaborators page behaviors need, without a browser:
//! - [`Page`]: document, window geometry, event queue and dispatch loop
//! - [`Storage`]: local-storage style key-value persistence
//! - intersection observers computed from per-element [`LayoutBox`]es
//!
//! Geometry is supplied by the embedder (tests, the scenario harness); nothing here performs
//! layout.

mod error;
mod event;
mod geometry;
mod observer;
mod page;
mod storage;

pub use error::PageError;
pub use event::{DispatchRecord, IntersectionEntry, Listener, PageEvent};
pub use geometry::{ColorScheme, LayoutBox, ScrollBehavior, ScrollRequest, Viewport};
pub use observer::{ObserverId, ObserverOptions, intersection_ratio, is_intersecting};
pub use page::{HISTORY_LIMIT, Page, SCROLL_REQUEST_LIMIT};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
