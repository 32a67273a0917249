use crate::config::{BehaviorConfig, compile};
use html::NodeId;
use page::{Listener, Page, PageEvent};

/// Decorative glow that follows the pointer.
pub struct CursorGlow {
    glow: NodeId,
}

impl CursorGlow {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.cursor_glow, "cursor glow")?;
        let doc = page.document();
        let glow = doc.query_selector(doc.root(), &sel)?;
        Some(Self { glow })
    }
}

impl Listener for CursorGlow {
    fn name(&self) -> &'static str {
        "cursor-glow"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::PointerMove { x, y } = event else {
            return;
        };
        let doc = page.document_mut();
        doc.set_style(self.glow, "left", &format!("{x}px"));
        doc.set_style(self.glow, "top", &format!("{y}px"));
        doc.add_class(self.glow, "visible");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_pointer() {
        let mut page = Page::from_html(r#"<body><div class="cursor-glow"></div></body>"#);
        let glow = page.document().select_first(".cursor-glow").unwrap().unwrap();
        let mut listeners: Vec<Box<dyn Listener>> =
            vec![Box::new(CursorGlow::attach(&mut page, &BehaviorConfig::default()).unwrap())];
        page.pointer_move(120.0, 48.5);
        page.run_until_idle(&mut listeners);
        let doc = page.document();
        assert_eq!(doc.style(glow, "left"), Some("120px"));
        assert_eq!(doc.style(glow, "top"), Some("48.5px"));
        assert!(doc.has_class(glow, "visible"));
    }
}
