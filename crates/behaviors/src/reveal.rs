use crate::config::{BehaviorConfig, compile};
use html::NodeId;
use page::{Listener, ObserverId, Page, PageEvent};
use std::collections::HashSet;

/// One-shot fade-in: marks elements `visible` the first time they scroll into view.
pub struct FadeIn {
    observer: ObserverId,
    triggered: HashSet<NodeId>,
}

impl FadeIn {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.fade_in, "fade-in")?;
        let doc = page.document();
        let targets = doc.query_selector_all(doc.root(), &sel);
        if targets.is_empty() {
            return None;
        }
        let observer = page.create_observer(config.reveal);
        for target in &targets {
            page.observe(observer, *target);
        }
        log::debug!(target: "behaviors.reveal", "observing {} elements", targets.len());
        Some(Self {
            observer,
            triggered: HashSet::new(),
        })
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }
}

impl Listener for FadeIn {
    fn name(&self) -> &'static str {
        "fade-in"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::Intersection(entry) = event else {
            return;
        };
        if entry.observer != self.observer || !entry.is_intersecting {
            return;
        }
        if !self.triggered.insert(entry.target) {
            return;
        }
        page.document_mut().add_class(entry.target, "visible");
        page.unobserve(self.observer, entry.target);
    }
}
