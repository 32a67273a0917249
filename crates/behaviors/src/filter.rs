//! In-page search: hides content blocks that do not contain the query and sections left with no
//! visible block.
use crate::config::{BehaviorConfig, compile};
use html::{Document, NodeId, SelectorList};
use page::{Listener, Page, PageEvent};

pub const MATCH_CLASS: &str = "search-match";

/// Lower-cases and trims a raw input value. The empty string means "no filter".
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub visible_blocks: usize,
    pub hidden_blocks: usize,
    pub visible_sections: usize,
    pub hidden_sections: usize,
}

fn is_shown(doc: &Document, id: NodeId) -> bool {
    doc.style(id, "display") != Some("none")
}

fn set_shown(doc: &mut Document, id: NodeId, shown: bool) {
    doc.set_style(id, "display", if shown { "block" } else { "none" });
}

#[derive(Clone, Debug)]
pub struct FilterEngine {
    blocks: SelectorList,
    sections: SelectorList,
}

impl FilterEngine {
    pub fn new(blocks: SelectorList, sections: SelectorList) -> Self {
        Self { blocks, sections }
    }

    /// Applies an already-normalized `query` to every block, then derives section visibility
    /// from the updated block states.
    pub fn apply(&self, doc: &mut Document, query: &str) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        let root = doc.root();

        for block in doc.query_selector_all(root, &self.blocks) {
            let matched = query.is_empty() || doc.text_content(block).to_lowercase().contains(query);
            set_shown(doc, block, matched);
            doc.set_class(block, MATCH_CLASS, matched && !query.is_empty());
            if matched {
                outcome.visible_blocks += 1;
            } else {
                outcome.hidden_blocks += 1;
            }
        }

        for section in doc.query_selector_all(root, &self.sections) {
            let visible = query.is_empty()
                || doc
                    .query_selector_all(section, &self.blocks)
                    .into_iter()
                    .any(|block| is_shown(doc, block));
            set_shown(doc, section, visible);
            if visible {
                outcome.visible_sections += 1;
            } else {
                outcome.hidden_sections += 1;
            }
        }

        log::debug!(target: "behaviors.filter", "query {query:?}: {outcome:?}");
        outcome
    }
}

/// Runs the filter engine on every input event of the search field.
pub struct SearchFilter {
    input: NodeId,
    engine: FilterEngine,
    query: String,
}

impl SearchFilter {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let selectors = &config.selectors;
        let input_sel = compile(&selectors.search_input, "search")?;
        let blocks = compile(&selectors.content_block, "search")?;
        let sections = compile(&selectors.section, "search")?;
        let doc = page.document();
        let Some(input) = doc.query_selector(doc.root(), &input_sel) else {
            log::debug!(target: "behaviors.filter", "no search input; filter inert");
            return None;
        };
        Some(Self {
            input,
            engine: FilterEngine::new(blocks, sections),
            query: String::new(),
        })
    }

}

impl Listener for SearchFilter {
    fn name(&self) -> &'static str {
        "search"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::Input { target, value } = event else {
            return;
        };
        if *target != self.input {
            return;
        }
        self.query = normalize_query(value);
        self.engine.apply(page.document_mut(), &self.query);
    }
}
