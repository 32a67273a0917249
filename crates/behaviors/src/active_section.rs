use crate::config::{BehaviorConfig, compile};
use html::SelectorList;
use page::{Listener, Page, PageEvent};

/// Highlights the sidebar link of the section currently being read.
///
/// Links are re-queried on every scroll so copies made after startup (the overlay table of
/// contents) are kept in sync too.
pub struct ActiveSection {
    sections: SelectorList,
    links: SelectorList,
    offset: f64,
}

impl ActiveSection {
    pub fn attach(_page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        Some(Self {
            sections: compile(&config.selectors.tracked_section, "active section")?,
            links: compile(&config.selectors.sidebar_link, "active section")?,
            offset: config.thresholds.active_section_offset,
        })
    }

    /// Id of the last section whose top, less the offset, is at or above `scroll_y`.
    pub fn current(&self, page: &Page) -> Option<String> {
        let doc = page.document();
        let scroll_y = page.scroll_y();
        let mut current = None;
        for section in doc.query_selector_all(doc.root(), &self.sections) {
            let Some(layout) = page.layout_box(section) else {
                continue;
            };
            if scroll_y >= layout.top - self.offset {
                current = doc.attribute(section, "id");
            }
        }
        current.map(str::to_string)
    }
}

impl Listener for ActiveSection {
    fn name(&self) -> &'static str {
        "active-section"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        if !matches!(event, PageEvent::Scroll) {
            return;
        }
        let wanted = self.current(page).map(|id| format!("#{id}"));
        let doc = page.document_mut();
        for link in doc.query_selector_all(doc.root(), &self.links) {
            let active = wanted.is_some() && doc.attribute(link, "href") == wanted.as_deref();
            doc.set_class(link, "active", active);
        }
    }
}
