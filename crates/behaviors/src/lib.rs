//! # behaviors
//!
//! The interactive layer of a static documentation site, expressed as [`page::Listener`]s:
//!
//! - theme preference ([`theme`]), persisted in page storage
//! - in-page search with section visibility ([`filter`])
//! - navbar emphasis and the mobile menu ([`navigation`])
//! - back-to-top, reading progress and anchor scrolling ([`scroll_effects`])
//! - one-shot reveal and count-up animations ([`reveal`], [`count_up`])
//! - overlay table of contents, active sidebar link, cursor glow
//!
//! [`install`] attaches everything a page supports. Features whose elements are missing are
//! simply not attached.

pub mod active_section;
pub mod config;
pub mod count_up;
pub mod cursor_glow;
pub mod filter;
pub mod navigation;
pub mod reveal;
pub mod scroll_effects;
pub mod theme;
pub mod toc;

pub use config::{BehaviorConfig, ConfigError, ThemeDefault};
pub use filter::{FilterEngine, FilterOutcome, normalize_query};
pub use theme::{Theme, ThemeStore};

use page::{Listener, Page};

pub const LOADING_CLASS: &str = "page-loading";

/// Attached feature controllers, in dispatch order.
pub struct Behaviors {
    listeners: Vec<Box<dyn Listener>>,
}

impl Behaviors {
    pub fn names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.listeners.iter().any(|l| l.name() == name)
    }

    pub fn run_until_idle(&mut self, page: &mut Page) -> usize {
        page.run_until_idle(&mut self.listeners)
    }

    fn push<L: Listener + 'static>(&mut self, listener: Option<L>) {
        if let Some(listener) = listener {
            log::debug!(target: "behaviors", "attached {}", listener.name());
            self.listeners.push(Box::new(listener));
        }
    }
}

/// Startup hook: wires every feature the page has elements for.
///
/// Anchor links are bound before the overlay table of contents copies the sidebar, so only
/// links present in the original markup scroll smoothly.
pub fn install(page: &mut Page, config: &BehaviorConfig) -> Behaviors {
    if let Some(body) = page.document().body() {
        page.document_mut().add_class(body, LOADING_CLASS);
    }

    let mut behaviors = Behaviors {
        listeners: Vec::new(),
    };
    behaviors.push(Some(theme::ThemeToggle::attach(page, config)));
    behaviors.push(navigation::NavbarShadow::attach(page, config));
    behaviors.push(navigation::MobileNav::attach(page, config));
    behaviors.push(scroll_effects::BackToTop::attach(page, config));
    behaviors.push(scroll_effects::AnchorScroll::attach(page, config));
    behaviors.push(scroll_effects::ScrollProgress::attach(page, config));
    behaviors.push(filter::SearchFilter::attach(page, config));
    behaviors.push(reveal::FadeIn::attach(page, config));
    behaviors.push(count_up::CountUp::attach(page, config));
    behaviors.push(toc::TocOverlay::attach(page, config));
    behaviors.push(active_section::ActiveSection::attach(page, config));
    behaviors.push(cursor_glow::CursorGlow::attach(page, config));

    log::info!(target: "behaviors", "installed {} behaviors", behaviors.len());
    behaviors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_page_gets_only_unconditional_features() {
        let mut page = Page::from_html("<html><body><p>hello</p></body></html>");
        let behaviors = install(&mut page, &BehaviorConfig::default());
        assert_eq!(
            behaviors.names(),
            ["theme", "scroll-progress", "active-section"]
        );
        let body = page.document().body().unwrap();
        assert!(page.document().has_class(body, LOADING_CLASS));
    }

    #[test]
    fn invalid_selector_only_disables_its_feature() {
        let mut config = BehaviorConfig::default();
        config.selectors.navbar = "nav[".into();
        let mut page = Page::from_html(
            r#"<body><nav class="navbar"></nav><button class="back-to-top">up</button></body>"#,
        );
        let behaviors = install(&mut page, &config);
        assert!(!behaviors.is_attached("navbar"));
        assert!(behaviors.is_attached("back-to-top"));
    }
}
