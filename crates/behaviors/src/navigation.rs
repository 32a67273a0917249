use crate::config::{BehaviorConfig, compile};
use html::{NodeId, SelectorList};
use page::{Listener, Page, PageEvent};

const OPEN_ICON: &str = "☰";
const CLOSE_ICON: &str = "✕";

/// Adds `scrolled` to the navigation bar once the page leaves the top.
pub struct NavbarShadow {
    navbar: NodeId,
    threshold: f64,
}

impl NavbarShadow {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.navbar, "navbar")?;
        let doc = page.document();
        let navbar = doc.query_selector(doc.root(), &sel)?;
        Some(Self {
            navbar,
            threshold: config.thresholds.navbar,
        })
    }
}

impl Listener for NavbarShadow {
    fn name(&self) -> &'static str {
        "navbar"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        if !matches!(event, PageEvent::Scroll) {
            return;
        }
        let scrolled = page.scroll_y() > self.threshold;
        page.document_mut().set_class(self.navbar, "scrolled", scrolled);
    }
}

/// Hamburger menu. Open state locks page scrolling.
pub struct MobileNav {
    toggle: NodeId,
    nav: NodeId,
    links: SelectorList,
    open: bool,
}

impl MobileNav {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let toggle_sel = compile(&config.selectors.mobile_toggle, "mobile nav")?;
        let nav_sel = compile(&config.selectors.mobile_nav, "mobile nav")?;
        let links = compile("a", "mobile nav")?;
        let doc = page.document();
        let toggle = doc.query_selector(doc.root(), &toggle_sel)?;
        let nav = doc.query_selector(doc.root(), &nav_sel)?;
        Some(Self {
            toggle,
            nav,
            links,
            open: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, page: &mut Page) {
        if self.open {
            return;
        }
        self.open = true;
        let doc = page.document_mut();
        doc.add_class(self.nav, "active");
        doc.set_text_content(self.toggle, CLOSE_ICON);
        page.lock_scroll();
        log::debug!(target: "behaviors.navigation", "mobile nav opened");
    }

    fn close(&mut self, page: &mut Page) {
        if !self.open {
            return;
        }
        self.open = false;
        let doc = page.document_mut();
        doc.remove_class(self.nav, "active");
        doc.set_text_content(self.toggle, OPEN_ICON);
        page.unlock_scroll();
        log::debug!(target: "behaviors.navigation", "mobile nav closed");
    }
}

impl Listener for MobileNav {
    fn name(&self) -> &'static str {
        "mobile-nav"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        match event {
            PageEvent::Click { target } => {
                let doc = page.document();
                if doc.contains(self.toggle, *target) {
                    if self.open {
                        self.close(page);
                    } else {
                        self.open(page);
                    }
                } else if doc.contains(self.nav, *target) {
                    let on_link = doc
                        .closest(*target, &self.links)
                        .is_some_and(|link| doc.contains(self.nav, link));
                    if on_link {
                        self.close(page);
                    }
                } else {
                    self.close(page);
                }
            }
            PageEvent::KeyDown { key } if key == "Escape" => self.close(page),
            _ => {}
        }
    }
}
