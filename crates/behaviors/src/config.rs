//! Behavior configuration. Every field has a default matching the stock documentation theme,
//! so an empty TOML file is a valid configuration.
use html::SelectorList;
use page::ObserverOptions;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid behavior config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    pub theme: ThemeConfig,
    pub thresholds: Thresholds,
    /// Fade-in observation.
    pub reveal: ObserverOptions,
    pub count_up: CountUpConfig,
    pub toc: TocConfig,
    pub selectors: Selectors,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            thresholds: Thresholds::default(),
            reveal: ObserverOptions {
                threshold: 0.1,
                root_margin_bottom: -50.0,
            },
            count_up: CountUpConfig::default(),
            toc: TocConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

impl BehaviorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

/// Where the theme comes from when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeDefault {
    #[default]
    Dark,
    Light,
    /// Follow the page's reported `prefers-color-scheme`.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub storage_key: String,
    pub default: ThemeDefault,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            default: ThemeDefault::Dark,
        }
    }
}

/// Scroll offsets in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub navbar: f64,
    pub back_to_top: f64,
    /// How far above a section's top it already counts as the current one.
    pub active_section_offset: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            navbar: 50.0,
            back_to_top: 500.0,
            active_section_offset: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountUpConfig {
    pub duration_ms: f64,
    pub observer: ObserverOptions,
}

impl Default for CountUpConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000.0,
            observer: ObserverOptions {
                threshold: 0.5,
                root_margin_bottom: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub open_label: String,
    pub close_label: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            open_label: "Open table of contents".to_string(),
            close_label: "Close table of contents".to_string(),
        }
    }
}

/// Role markers the behaviors look for in the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selectors {
    pub theme_toggle: String,
    pub search_input: String,
    pub content_block: String,
    pub section: String,
    pub navbar: String,
    pub mobile_toggle: String,
    pub mobile_nav: String,
    pub back_to_top: String,
    pub in_page_link: String,
    pub tracked_section: String,
    pub sidebar: String,
    pub sidebar_link: String,
    pub fade_in: String,
    pub count_up: String,
    pub cursor_glow: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            theme_toggle: ".theme-toggle".into(),
            search_input: "#docs-search".into(),
            content_block: ".article-block".into(),
            section: ".docs-content section".into(),
            navbar: ".navbar".into(),
            mobile_toggle: ".mobile-toggle".into(),
            mobile_nav: ".mobile-nav".into(),
            back_to_top: ".back-to-top".into(),
            in_page_link: r##"a[href^="#"]"##.into(),
            tracked_section: ".docs-content section[id]".into(),
            sidebar: ".sidebar".into(),
            sidebar_link: ".sidebar-nav a".into(),
            fade_in: ".fade-in".into(),
            count_up: ".stat-number".into(),
            cursor_glow: ".cursor-glow".into(),
        }
    }
}

/// Compiles a configured selector; an invalid one disables `feature` with a warning.
pub(crate) fn compile(selector: &str, feature: &'static str) -> Option<SelectorList> {
    match SelectorList::parse(selector) {
        Ok(list) => Some(list),
        Err(err) => {
            log::warn!(target: "behaviors.config", "{feature} disabled: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = BehaviorConfig::from_toml_str("").unwrap();
        assert_eq!(config, BehaviorConfig::default());
        assert_eq!(config.theme.storage_key, "theme");
        assert_eq!(config.thresholds.navbar, 50.0);
        assert_eq!(config.reveal.root_margin_bottom, -50.0);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = BehaviorConfig::from_toml_str(
            r#"
            [theme]
            storage_key = "doj-theme"
            default = "system"

            [thresholds]
            back_to_top = 300

            [selectors]
            search_input = "input.search"
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.storage_key, "doj-theme");
        assert_eq!(config.theme.default, ThemeDefault::System);
        assert_eq!(config.thresholds.back_to_top, 300.0);
        assert_eq!(config.thresholds.navbar, 50.0);
        assert_eq!(config.selectors.search_input, "input.search");
        assert_eq!(config.selectors.content_block, ".article-block");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(BehaviorConfig::from_toml_str("[theme]\nkey = \"x\"").is_err());
    }

    #[test]
    fn invalid_selector_disables_feature() {
        assert!(compile("a[href", "anchors").is_none());
        assert!(compile(".navbar", "navbar").is_some());
    }
}
