use serde::Deserialize;

/// Window scroll state. All values are CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub scroll_y: f64,
    /// `window.innerHeight`
    pub inner_height: f64,
    /// `document.documentElement.scrollHeight`
    pub scroll_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            inner_height: 800.0,
            scroll_height: 800.0,
        }
    }
}

impl Viewport {
    pub fn max_scroll(&self) -> f64 {
        let max = self.scroll_height - self.inner_height;
        if max.is_finite() && max > 0.0 { max } else { 0.0 }
    }

    pub fn clamp_scroll(&self, y: f64) -> f64 {
        if y.is_nan() {
            return 0.0;
        }
        y.clamp(0.0, self.max_scroll())
    }
}

/// Vertical placement of an element relative to the document top.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LayoutBox {
    pub top: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height.max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// A programmatic scroll issued by a behavior (`scrollTo`, `scrollIntoView`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}
