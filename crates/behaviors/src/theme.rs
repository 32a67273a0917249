//! Theme preference: persisted `dark`/`light` flag mirrored onto `data-theme`.
use crate::config::{BehaviorConfig, ThemeDefault, compile};
use html::NodeId;
use page::{ColorScheme, Listener, Page, PageEvent};
use std::fmt;

const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parses a persisted value. Anything but the two known names is treated as unset.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Toggle indicator: the theme a click switches to.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single-key preference store behind the theme toggle.
#[derive(Clone, Debug)]
pub struct ThemeStore {
    key: String,
    default: ThemeDefault,
}

impl ThemeStore {
    pub fn new(key: impl Into<String>, default: ThemeDefault) -> Self {
        Self {
            key: key.into(),
            default,
        }
    }

    pub fn get(&self, page: &Page) -> Theme {
        if let Some(theme) = page.storage().get_item(&self.key).as_deref().and_then(Theme::parse) {
            return theme;
        }
        match self.default {
            ThemeDefault::Dark => Theme::Dark,
            ThemeDefault::Light => Theme::Light,
            ThemeDefault::System => match page.color_scheme() {
                ColorScheme::Dark => Theme::Dark,
                ColorScheme::Light => Theme::Light,
            },
        }
    }

    pub fn persist(&self, page: &mut Page, theme: Theme) {
        let key = self.key.as_str();
        if page.storage().get_item(key).as_deref() != Some(theme.as_str()) {
            page.storage_mut().set_item(key, theme.as_str());
        }
    }
}

/// Applies the stored theme at startup and flips it on toggle clicks.
pub struct ThemeToggle {
    store: ThemeStore,
    toggle: Option<NodeId>,
    current: Theme,
}

impl ThemeToggle {
    /// Always attaches: the stored theme is applied even on pages without a toggle control.
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Self {
        let toggle = compile(&config.selectors.theme_toggle, "theme toggle")
            .and_then(|sel| page.document().query_selector(page.document().root(), &sel));
        let store = ThemeStore::new(config.theme.storage_key.clone(), config.theme.default);
        let current = store.get(page);
        let this = Self {
            store,
            toggle,
            current,
        };
        this.render(page);
        log::debug!(target: "behaviors.theme", "initial theme {current}");
        this
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, page: &mut Page, theme: Theme) {
        self.current = theme;
        self.store.persist(page, theme);
        self.render(page);
    }

    pub fn toggle(&mut self, page: &mut Page) -> Theme {
        let next = self.current.toggled();
        self.set(page, next);
        log::debug!(target: "behaviors.theme", "toggled to {next}");
        next
    }

    fn render(&self, page: &mut Page) {
        let doc = page.document_mut();
        if let Some(root) = doc.document_element() {
            doc.set_attribute(root, THEME_ATTRIBUTE, self.current.as_str());
        }
        if let Some(toggle) = self.toggle {
            if doc.text_content(toggle) != self.current.icon() {
                doc.set_text_content(toggle, self.current.icon());
            }
        }
    }
}

impl Listener for ThemeToggle {
    fn name(&self) -> &'static str {
        "theme"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::Click { target } = event else {
            return;
        };
        if let Some(toggle) = self.toggle {
            if page.document().contains(toggle, *target) {
                self.toggle(page);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page::MemoryStorage;

    const PAGE: &str = r#"<html><body><button class="theme-toggle">?</button></body></html>"#;

    fn theme_attr(page: &Page) -> Option<String> {
        let doc = page.document();
        doc.document_element()
            .and_then(|root| doc.attribute(root, THEME_ATTRIBUTE))
            .map(str::to_string)
    }

    #[test]
    fn defaults_to_dark_without_stored_value() {
        let mut page = Page::from_html(PAGE);
        let theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        assert_eq!(theme.current(), Theme::Dark);
        assert_eq!(theme_attr(&page).as_deref(), Some("dark"));
        let toggle = page.document().select_first(".theme-toggle").unwrap().unwrap();
        assert_eq!(page.document().text_content(toggle), "☀️");
        assert_eq!(page.storage().get_item("theme"), None);
    }

    #[test]
    fn stored_value_wins_and_garbage_is_ignored() {
        let mut page = Page::from_html(PAGE)
            .with_storage(Box::new(MemoryStorage::new().with_item("theme", "light")));
        let theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        assert_eq!(theme.current(), Theme::Light);

        let mut page = Page::from_html(PAGE)
            .with_storage(Box::new(MemoryStorage::new().with_item("theme", "sepia")));
        let theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        assert_eq!(theme.current(), Theme::Dark);
    }

    #[test]
    fn system_default_follows_color_scheme() {
        let mut config = BehaviorConfig::default();
        config.theme.default = ThemeDefault::System;
        let mut page = Page::from_html(PAGE).with_color_scheme(ColorScheme::Light);
        assert_eq!(ThemeToggle::attach(&mut page, &config).current(), Theme::Light);
    }

    #[test]
    fn toggle_is_a_two_cycle() {
        let mut page = Page::from_html(PAGE);
        let mut theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        assert_eq!(theme.toggle(&mut page), Theme::Light);
        assert_eq!(page.storage().get_item("theme").as_deref(), Some("light"));
        assert_eq!(theme.toggle(&mut page), Theme::Dark);
        assert_eq!(theme_attr(&page).as_deref(), Some("dark"));
        assert_eq!(page.storage().get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn repeated_set_is_idempotent() {
        let mut page = Page::from_html(PAGE);
        let mut theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        theme.set(&mut page, Theme::Light);
        let len = page.document().len();
        theme.set(&mut page, Theme::Light);
        assert_eq!(page.document().len(), len);
        assert_eq!(theme_attr(&page).as_deref(), Some("light"));
    }

    #[test]
    fn page_without_toggle_still_gets_theme() {
        let mut page = Page::from_html("<html><body><p>hi</p></body></html>");
        let mut theme = ThemeToggle::attach(&mut page, &BehaviorConfig::default());
        theme.toggle(&mut page);
        assert_eq!(theme_attr(&page).as_deref(), Some("light"));
    }
}
