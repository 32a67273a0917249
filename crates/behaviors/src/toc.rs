//! Overlay table of contents for narrow screens: a floating button opens a copy of the sidebar.
use crate::config::{BehaviorConfig, compile};
use html::{Document, DomError, NodeId, SelectorList};
use page::{Listener, Page, PageEvent};

pub struct TocOverlay {
    button: NodeId,
    overlay: NodeId,
    panel: NodeId,
    close: NodeId,
    links: SelectorList,
    open: bool,
}

fn button(doc: &mut Document, class: &str, label: &str, icon: &str) -> NodeId {
    let node = doc.create_element(
        "button",
        vec![
            ("class".into(), Some(class.into())),
            ("aria-label".into(), Some(label.into())),
        ],
    );
    doc.set_text_content(node, icon);
    node
}

impl TocOverlay {
    pub const BUTTON_CLASS: &'static str = "mobile-toc-btn";
    pub const OVERLAY_CLASS: &'static str = "sidebar-overlay";
    pub const CLOSE_CLASS: &'static str = "sidebar-close";

    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sidebar_sel = compile(&config.selectors.sidebar, "toc overlay")?;
        let links = compile("a", "toc overlay")?;
        let doc = page.document_mut();
        let sidebar = doc.query_selector(doc.root(), &sidebar_sel)?;
        let body = doc.body()?;
        match Self::build(doc, body, sidebar, config) {
            Ok((button, overlay, panel, close)) => Some(Self {
                button,
                overlay,
                panel,
                close,
                links,
                open: false,
            }),
            Err(err) => {
                log::warn!(target: "behaviors.toc", "cannot build overlay: {err}");
                None
            }
        }
    }

    fn build(
        doc: &mut Document,
        body: NodeId,
        sidebar: NodeId,
        config: &BehaviorConfig,
    ) -> Result<(NodeId, NodeId, NodeId, NodeId), DomError> {
        let open = button(doc, Self::BUTTON_CLASS, &config.toc.open_label, "📑");
        doc.append_child(body, open)?;

        let overlay = doc.create_element(
            "div",
            vec![("class".into(), Some(Self::OVERLAY_CLASS.into()))],
        );
        let panel = doc.clone_subtree(sidebar)?;
        let close = button(doc, Self::CLOSE_CLASS, &config.toc.close_label, "✕");
        doc.prepend_child(panel, close)?;
        doc.append_child(overlay, panel)?;
        doc.append_child(body, overlay)?;
        Ok((open, overlay, panel, close))
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn show(&mut self, page: &mut Page) {
        if self.open {
            return;
        }
        self.open = true;
        page.document_mut().add_class(self.overlay, "active");
        page.lock_scroll();
    }

    fn hide(&mut self, page: &mut Page) {
        if !self.open {
            return;
        }
        self.open = false;
        page.document_mut().remove_class(self.overlay, "active");
        page.unlock_scroll();
    }
}

impl Listener for TocOverlay {
    fn name(&self) -> &'static str {
        "toc-overlay"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        match event {
            PageEvent::Click { target } => {
                let target = *target;
                let doc = page.document();
                if doc.contains(self.button, target) {
                    self.show(page);
                } else if doc.contains(self.close, target) || target == self.overlay {
                    self.hide(page);
                } else if doc
                    .closest(target, &self.links)
                    .is_some_and(|link| doc.contains(self.panel, link))
                {
                    self.hide(page);
                }
            }
            PageEvent::KeyDown { key } if key == "Escape" => self.hide(page),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><body>
        <aside class="sidebar"><nav class="sidebar-nav"><a href="#a">A</a><a href="#b">B</a></nav></aside>
        <main class="docs-content"><section id="a">A</section><section id="b">B</section></main>
    </body></html>"##;

    fn setup() -> (Page, Vec<Box<dyn Listener>>) {
        let mut page = Page::from_html(PAGE);
        let toc = TocOverlay::attach(&mut page, &BehaviorConfig::default()).unwrap();
        (page, vec![Box::new(toc)])
    }

    fn find(page: &Page, selector: &str) -> NodeId {
        page.document().select_first(selector).unwrap().unwrap()
    }

    #[test]
    fn builds_button_and_cloned_panel() {
        let (page, _) = setup();
        let doc = page.document();
        let body = doc.body().unwrap();
        let kids = doc.children(body);
        let overlay = find(&page, ".sidebar-overlay");
        let button = find(&page, ".mobile-toc-btn");
        assert_eq!(&kids[kids.len() - 2..], &[button, overlay]);
        assert_eq!(doc.text_content(button), "📑");
        assert_eq!(doc.select(".sidebar").unwrap().len(), 2);
        assert_eq!(doc.select(".sidebar-nav a").unwrap().len(), 4);
        let panel = find(&page, ".sidebar-overlay > .sidebar");
        assert_eq!(
            doc.children(panel).first().copied(),
            Some(find(&page, ".sidebar-close"))
        );
    }

    #[test]
    fn open_and_close_paths() {
        let (mut page, mut listeners) = setup();
        let button = find(&page, ".mobile-toc-btn");
        let overlay = find(&page, ".sidebar-overlay");
        let close = find(&page, ".sidebar-close");
        let cloned_link = find(&page, ".sidebar-overlay a");
        let panel = find(&page, ".sidebar-overlay > .sidebar");
        let original_link = find(&page, "aside.sidebar a");

        for closer in [close, overlay, cloned_link] {
            page.click(button);
            page.run_until_idle(&mut listeners);
            assert!(page.document().has_class(overlay, "active"));
            assert!(page.is_scroll_locked());
            page.click(closer);
            page.run_until_idle(&mut listeners);
            assert!(!page.document().has_class(overlay, "active"));
            assert!(!page.is_scroll_locked());
        }

        page.click(button);
        page.click(panel);
        page.click(original_link);
        page.run_until_idle(&mut listeners);
        assert!(page.document().has_class(overlay, "active"));
        page.key_down("Escape");
        page.run_until_idle(&mut listeners);
        assert!(!page.document().has_class(overlay, "active"));
    }

    #[test]
    fn double_open_needs_single_close() {
        let mut page = Page::from_html(PAGE);
        let mut toc = TocOverlay::attach(&mut page, &BehaviorConfig::default()).unwrap();
        let button = find(&page, ".mobile-toc-btn");
        let escape = PageEvent::KeyDown {
            key: "Escape".into(),
        };
        toc.handle(&mut page, &PageEvent::Click { target: button });
        toc.handle(&mut page, &PageEvent::Click { target: button });
        assert!(toc.is_open());
        toc.handle(&mut page, &escape);
        assert!(!toc.is_open());
        assert!(!page.is_scroll_locked());
        toc.handle(&mut page, &escape);
        assert!(!page.is_scroll_locked());
    }

    #[test]
    fn no_sidebar_no_overlay() {
        let mut page = Page::from_html("<body><p>x</p></body>");
        let len = page.document().len();
        assert!(TocOverlay::attach(&mut page, &BehaviorConfig::default()).is_none());
        assert_eq!(page.document().len(), len);
    }
}
