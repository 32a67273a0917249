//! Scenario files: the geometry a page is laid out with and the interactions to replay.
//!
//! ```toml
//! color_scheme = "dark"
//!
//! [viewport]
//! inner_height = 800
//! scroll_height = 4000
//!
//! [[boxes]]
//! selector = "#patrol"
//! top = 300
//! height = 1200
//!
//! [[events]]
//! kind = "input"
//! target = "#docs-search"
//! value = "patrol"
//!
//! [[events]]
//! kind = "frames"
//! count = 120
//! ```

use anyhow::{Context, Result, bail};
use behaviors::Behaviors;
use html::NodeId;
use page::{ColorScheme, LayoutBox, Page, Viewport};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub viewport: Viewport,
    pub color_scheme: ColorScheme,
    pub boxes: Vec<BoxSpec>,
    pub events: Vec<Step>,
}

/// Layout box assigned to every element matching `selector`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSpec {
    pub selector: String,
    pub top: f64,
    pub height: f64,
}

fn default_frame_ms() -> f64 {
    16.0
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    Input {
        target: String,
        value: String,
    },
    Scroll {
        y: f64,
    },
    Click {
        target: String,
    },
    Key {
        key: String,
    },
    Pointer {
        x: f64,
        y: f64,
    },
    Frames {
        count: u32,
        #[serde(default = "default_frame_ms")]
        interval_ms: f64,
    },
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("invalid scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Applies the scenario's viewport, colour scheme and layout boxes to `page`.
    pub fn prepare(&self, page: Page) -> Result<Page> {
        let mut page = page
            .with_viewport(self.viewport)
            .with_color_scheme(self.color_scheme);
        for spec in &self.boxes {
            page.set_layout_for(&spec.selector, LayoutBox::new(spec.top, spec.height))
                .with_context(|| format!("layout box for {:?}", spec.selector))?;
        }
        Ok(page)
    }

    /// Feeds every step to the page, running the behaviors to idle after each one. Returns the
    /// number of dispatched events.
    pub fn replay(&self, page: &mut Page, behaviors: &mut Behaviors) -> Result<usize> {
        let mut dispatched = 0;
        for (index, step) in self.events.iter().enumerate() {
            log::debug!(target: "docsite.scenario", "step {index}: {step:?}");
            match step {
                Step::Input { target, value } => {
                    let node = resolve(page, target).with_context(|| format!("step {index}"))?;
                    page.input(node, value);
                }
                Step::Scroll { y } => page.scroll(*y),
                Step::Click { target } => {
                    let node = resolve(page, target).with_context(|| format!("step {index}"))?;
                    page.click(node);
                }
                Step::Key { key } => page.key_down(key),
                Step::Pointer { x, y } => page.pointer_move(*x, *y),
                Step::Frames { count, interval_ms } => {
                    for _ in 0..*count {
                        page.advance_frame(*interval_ms);
                        dispatched += behaviors.run_until_idle(page);
                    }
                }
            }
            dispatched += behaviors.run_until_idle(page);
        }
        Ok(dispatched)
    }
}

fn resolve(page: &Page, selector: &str) -> Result<NodeId> {
    match page.document().select_first(selector)? {
        Some(node) => Ok(node),
        None => bail!("no element matches {selector:?}"),
    }
}
