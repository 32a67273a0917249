//! Scroll-position effects: back-to-top control, reading progress bar and in-page anchors.
use crate::config::{BehaviorConfig, compile};
use html::{NodeId, SelectorList};
use page::{Listener, Page, PageEvent, ScrollBehavior};

/// Percentage of the scrollable height already scrolled, in `[0, 100]`.
///
/// Pages that cannot scroll (or report nonsense geometry) are at 0%.
pub fn scroll_progress(scroll_y: f64, scroll_height: f64, inner_height: f64) -> f64 {
    let scrollable = scroll_height - inner_height;
    if !scrollable.is_finite() || scrollable <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

pub struct BackToTop {
    button: NodeId,
    threshold: f64,
}

impl BackToTop {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.back_to_top, "back-to-top")?;
        let doc = page.document();
        let button = doc.query_selector(doc.root(), &sel)?;
        Some(Self {
            button,
            threshold: config.thresholds.back_to_top,
        })
    }
}

impl Listener for BackToTop {
    fn name(&self) -> &'static str {
        "back-to-top"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        match event {
            PageEvent::Scroll => {
                let visible = page.scroll_y() > self.threshold;
                page.document_mut().set_class(self.button, "visible", visible);
            }
            PageEvent::Click { target } if page.document().contains(self.button, *target) => {
                page.scroll_to(0.0, ScrollBehavior::Smooth);
            }
            _ => {}
        }
    }
}

/// Thin bar prepended to `<body>` whose width tracks [`scroll_progress`].
pub struct ScrollProgress {
    bar: NodeId,
}

impl ScrollProgress {
    pub const CLASS: &'static str = "scroll-progress";

    pub fn attach(page: &mut Page, _config: &BehaviorConfig) -> Option<Self> {
        let doc = page.document_mut();
        let body = doc.body()?;
        let bar = doc.create_element("div", vec![("class".into(), Some(Self::CLASS.into()))]);
        if let Err(err) = doc.prepend_child(body, bar) {
            log::warn!(target: "behaviors.progress", "cannot insert progress bar: {err}");
            return None;
        }
        Some(Self { bar })
    }

    pub fn bar(&self) -> NodeId {
        self.bar
    }
}

impl Listener for ScrollProgress {
    fn name(&self) -> &'static str {
        "scroll-progress"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        if !matches!(event, PageEvent::Scroll) {
            return;
        }
        let vp = *page.viewport();
        let pct = scroll_progress(vp.scroll_y, vp.scroll_height, vp.inner_height);
        page.document_mut().set_style(self.bar, "width", &format!("{pct}%"));
    }
}

/// Smooth scrolling for `href="#id"` links present at startup.
pub struct AnchorScroll {
    anchors: Vec<NodeId>,
}

impl AnchorScroll {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.in_page_link, "anchor scrolling")?;
        let doc = page.document();
        let anchors = doc.query_selector_all(doc.root(), &sel);
        if anchors.is_empty() {
            return None;
        }
        Some(Self { anchors })
    }

    fn resolve(page: &Page, href: &str) -> Option<NodeId> {
        match SelectorList::parse(href) {
            Ok(sel) => page.document().query_selector(page.document().root(), &sel),
            Err(err) => {
                log::debug!(target: "behaviors.anchors", "ignoring href {href:?}: {err}");
                None
            }
        }
    }
}

impl Listener for AnchorScroll {
    fn name(&self) -> &'static str {
        "anchors"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::Click { target } = event else {
            return;
        };
        let doc = page.document();
        // Innermost bound anchor containing the click target.
        let Some(anchor) = std::iter::once(*target)
            .chain(doc.ancestors(*target))
            .find(|id| self.anchors.contains(id))
        else {
            return;
        };
        let Some(href) = doc.attribute(anchor, "href").map(str::to_string) else {
            return;
        };
        if let Some(dest) = Self::resolve(page, &href) {
            page.prevent_default();
            page.scroll_into_view(dest, ScrollBehavior::Smooth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page::{LayoutBox, ScrollRequest, Viewport};
    use proptest::prelude::*;

    const PAGE: &str = r##"<html><body>
        <a id="to-usage" href="#usage"><span>Usage</span></a>
        <a id="to-nowhere" href="#missing">Nowhere</a>
        <a id="bare" href="#">Top</a>
        <section id="usage">Usage</section>
        <button class="back-to-top">↑</button>
    </body></html>"##;

    fn page() -> Page {
        Page::from_html(PAGE).with_viewport(Viewport {
            scroll_y: 0.0,
            inner_height: 1000.0,
            scroll_height: 3000.0,
        })
    }

    fn find(page: &Page, selector: &str) -> NodeId {
        page.document().select_first(selector).unwrap().unwrap()
    }

    proptest! {
        #[test]
        fn progress_stays_within_bounds(
            scroll_y in any::<f64>(),
            scroll_height in any::<f64>(),
            inner_height in any::<f64>(),
        ) {
            let pct = scroll_progress(scroll_y, scroll_height, inner_height);
            prop_assert!(!pct.is_nan());
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn progress_is_guarded() {
        assert_eq!(scroll_progress(0.0, 800.0, 800.0), 0.0);
        assert_eq!(scroll_progress(100.0, 500.0, 800.0), 0.0);
        assert_eq!(scroll_progress(500.0, 2000.0, 1000.0), 50.0);
        assert_eq!(scroll_progress(5000.0, 2000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress(f64::NAN, 2000.0, 1000.0), 0.0);
        assert_eq!(scroll_progress(10.0, f64::INFINITY, 1000.0), 0.0);
        for y in [0.0, 1.0, 999.0, 1e9] {
            for h in [0.0, 800.0, 801.0, 5000.0] {
                let pct = scroll_progress(y, h, 800.0);
                assert!(!pct.is_nan() && (0.0..=100.0).contains(&pct));
            }
        }
    }

    #[test]
    fn progress_bar_is_first_in_body_and_tracks_scroll() {
        let mut page = page();
        let progress = ScrollProgress::attach(&mut page, &BehaviorConfig::default()).unwrap();
        let bar = progress.bar();
        let body = page.document().body().unwrap();
        assert_eq!(page.document().children(body).first(), Some(&bar));

        let mut listeners: Vec<Box<dyn Listener>> = vec![Box::new(progress)];
        page.scroll(1000.0);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.document().style(bar, "width"), Some("50%"));
        page.scroll(2000.0);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.document().style(bar, "width"), Some("100%"));
    }

    #[test]
    fn back_to_top_visibility_and_click() {
        let mut page = page();
        let button = find(&page, ".back-to-top");
        let mut listeners: Vec<Box<dyn Listener>> =
            vec![Box::new(BackToTop::attach(&mut page, &BehaviorConfig::default()).unwrap())];
        page.scroll(500.0);
        page.run_until_idle(&mut listeners);
        assert!(!page.document().has_class(button, "visible"));
        page.scroll(800.0);
        page.run_until_idle(&mut listeners);
        assert!(page.document().has_class(button, "visible"));

        page.click(button);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.scroll_y(), 0.0);
        assert!(!page.document().has_class(button, "visible"));
        assert_eq!(
            page.scroll_requests().back(),
            Some(&ScrollRequest {
                top: 0.0,
                behavior: ScrollBehavior::Smooth
            })
        );
    }

    #[test]
    fn anchor_click_scrolls_to_target() {
        let mut page = page();
        let usage = find(&page, "#usage");
        page.set_layout_box(usage, LayoutBox::new(1200.0, 400.0));
        let label = find(&page, "#to-usage span");
        let mut listeners: Vec<Box<dyn Listener>> =
            vec![Box::new(AnchorScroll::attach(&mut page, &BehaviorConfig::default()).unwrap())];

        page.click(label);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.scroll_y(), 1200.0);
        assert!(page.history()[0].default_prevented);
    }

    #[test]
    fn unresolvable_anchors_keep_default() {
        let mut page = page();
        let nowhere = find(&page, "#to-nowhere");
        let bare = find(&page, "#bare");
        let mut listeners: Vec<Box<dyn Listener>> =
            vec![Box::new(AnchorScroll::attach(&mut page, &BehaviorConfig::default()).unwrap())];
        page.click(nowhere);
        page.click(bare);
        page.run_until_idle(&mut listeners);
        assert!(page.history().iter().all(|r| !r.default_prevented));
        assert!(page.scroll_requests().is_empty());
    }
}
