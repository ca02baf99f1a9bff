use crate::app::App;
use crate::traits::Page;

impl<T, P: Page, D> App<T, P, D> {
    /// Flip the dark-mode class on `<body>`. Not persisted across reloads.
    pub fn toggle_dark_mode(&self) -> bool {
        let enabled = self.page.toggle_body_class(&self.config.dom.dark_mode_class);
        tracing::debug!(enabled, "dark mode toggled");
        enabled
    }

    /// Show or hide the collapsed navigation list. `None` if the page has none.
    pub fn toggle_menu(&self) -> Option<bool> {
        let dom = &self.config.dom;
        let open = self.page.toggle_class(&dom.nav_menu, &dom.menu_open_class);
        if open.is_none() {
            tracing::error!(selector = %dom.nav_menu, "Navigation menu not found.");
        }
        open
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, FakePage};

    #[test]
    fn test_dark_mode_flips() {
        let app = app(FakePage::new());
        assert!(app.toggle_dark_mode());
        assert!(app.page.body_has_class("dark-mode"));
        assert!(!app.toggle_dark_mode());
        assert!(!app.page.body_has_class("dark-mode"));
    }

    #[test]
    fn test_menu_toggles_show_class() {
        let app = app(FakePage::new().with_element("nav ul.collapsed", ""));
        assert_eq!(app.toggle_menu(), Some(true));
        assert!(app.page.has_class("nav ul.collapsed", "show"));
        assert_eq!(app.toggle_menu(), Some(false));
    }

    #[test]
    fn test_missing_menu_is_harmless() {
        let app = app(FakePage::new());
        assert_eq!(app.toggle_menu(), None);
    }
}
