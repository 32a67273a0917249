//! Intersection observation over the page's layout boxes.
use crate::geometry::{LayoutBox, Viewport};
use html::NodeId;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObserverOptions {
    /// Minimum visible fraction of the target for it to count as intersecting.
    pub threshold: f64,
    /// Added to the bottom edge of the viewport; negative values shrink it.
    pub root_margin_bottom: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin_bottom: 0.0,
        }
    }
}

/// Visible fraction of `target` inside the (margin-adjusted) viewport.
pub fn intersection_ratio(viewport: &Viewport, target: &LayoutBox, options: &ObserverOptions) -> f64 {
    let root_top = viewport.scroll_y;
    let root_bottom = viewport.scroll_y + viewport.inner_height + options.root_margin_bottom;
    if !(root_bottom > root_top) {
        return 0.0;
    }
    if target.height <= 0.0 {
        let inside = target.top >= root_top && target.top <= root_bottom;
        return if inside { 1.0 } else { 0.0 };
    }
    let overlap = target.bottom().min(root_bottom) - target.top.max(root_top);
    if overlap <= 0.0 {
        return 0.0;
    }
    (overlap / target.height).clamp(0.0, 1.0)
}

pub fn is_intersecting(ratio: f64, options: &ObserverOptions) -> bool {
    ratio > 0.0 && ratio >= options.threshold
}

#[derive(Debug)]
struct Observation {
    target: NodeId,
    /// Last state reported to listeners; `None` until the initial entry is queued.
    reported: Option<bool>,
}

#[derive(Debug)]
struct Observer {
    options: ObserverOptions,
    observations: Vec<Observation>,
}

#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    observers: Vec<Observer>,
}

/// A state change the page turns into an `Intersection` event.
pub(crate) struct PendingEntry {
    pub observer: ObserverId,
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl ObserverRegistry {
    pub fn create(&mut self, options: ObserverOptions) -> ObserverId {
        let id = ObserverId(self.observers.len() as u32);
        self.observers.push(Observer {
            options,
            observations: Vec::new(),
        });
        id
    }

    pub fn observe(&mut self, observer: ObserverId, target: NodeId) -> bool {
        let Some(obs) = self.observers.get_mut(observer.0 as usize) else {
            return false;
        };
        if obs.observations.iter().any(|o| o.target == target) {
            return false;
        }
        obs.observations.push(Observation {
            target,
            reported: None,
        });
        true
    }

    pub fn unobserve(&mut self, observer: ObserverId, target: NodeId) {
        if let Some(obs) = self.observers.get_mut(observer.0 as usize) {
            obs.observations.retain(|o| o.target != target);
        }
    }

    pub fn observed_count(&self, observer: ObserverId) -> usize {
        self.observers
            .get(observer.0 as usize)
            .map_or(0, |o| o.observations.len())
    }

    /// Recomputes every observation and returns the ones whose state changed.
    pub fn update(
        &mut self,
        viewport: &Viewport,
        layout_of: impl Fn(NodeId) -> Option<LayoutBox>,
    ) -> Vec<PendingEntry> {
        let mut out = Vec::new();
        for (index, obs) in self.observers.iter_mut().enumerate() {
            for o in &mut obs.observations {
                let ratio = layout_of(o.target)
                    .map(|b| intersection_ratio(viewport, &b, &obs.options))
                    .unwrap_or(0.0);
                let now = is_intersecting(ratio, &obs.options);
                if o.reported == Some(now) {
                    continue;
                }
                o.reported = Some(now);
                out.push(PendingEntry {
                    observer: ObserverId(index as u32),
                    target: o.target,
                    ratio,
                    is_intersecting: now,
                });
            }
        }
        out
    }
}
