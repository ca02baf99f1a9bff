use crate::app::App;
use crate::config::DomConfig;
use crate::traits::{Dialogs, Page};

const DEFAULT_CONFIRM: &str = "Are you sure?";

/// Listeners attached when the page has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// `.menu-toggle` click → [`App::toggle_menu`].
    MenuToggle,
    /// `#closeModalButton` click → close the modal and end the search.
    CloseModal,
    /// `#darkModeToggle` click → [`App::toggle_dark_mode`].
    DarkModeToggle,
    /// Every `.confirm-btn`: block the click unless the user confirms its
    /// `data-message`.
    ConfirmButton,
}

impl Binding {
    pub const ALL: &[Binding] = &[
        Self::MenuToggle,
        Self::CloseModal,
        Self::DarkModeToggle,
        Self::ConfirmButton,
    ];

    /// CSS selector of the element(s) the binding listens on.
    pub fn selector(self, dom: &DomConfig) -> String {
        match self {
            Self::MenuToggle => dom.menu_toggle.clone(),
            Self::CloseModal => format!("#{}", dom.close_modal_button),
            Self::DarkModeToggle => format!("#{}", dom.dark_mode_toggle),
            Self::ConfirmButton => dom.confirm_button.clone(),
        }
    }

    /// Whether the binding applies to every match or only the first.
    pub fn all_matches(self) -> bool {
        matches!(self, Self::ConfirmButton)
    }
}

impl<T, P: Page, D> App<T, P, D> {
    /// Bindings whose elements are present, with their selectors.
    pub fn bindings(&self) -> Vec<(Binding, String)> {
        Binding::ALL
            .iter()
            .map(|&binding| (binding, binding.selector(&self.config.dom)))
            .filter(|(binding, selector)| {
                let present = self.page.exists(selector);
                if !present {
                    tracing::debug!(?binding, %selector, "element absent, not binding");
                }
                present
            })
            .collect()
    }

    /// Run a synchronous binding. Returns `false` for bindings the host has
    /// to drive itself ([`Binding::ConfirmButton`] and [`Binding::CloseModal`],
    /// which also owns the search session).
    pub fn dispatch(&self, binding: Binding) -> bool {
        match binding {
            Binding::MenuToggle => {
                self.toggle_menu();
                true
            }
            Binding::DarkModeToggle => {
                self.toggle_dark_mode();
                true
            }
            Binding::CloseModal | Binding::ConfirmButton => false,
        }
    }
}

/// Question shown for a confirmation. An absent or blank message falls back
/// to a generic one.
pub fn confirm_message(message: Option<&str>) -> &str {
    message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or(DEFAULT_CONFIRM)
}

impl<T, P, D: Dialogs> App<T, P, D> {
    /// Ask the user to confirm [`confirm_message`]`(message)`.
    pub async fn confirm_action(&self, message: Option<&str>) -> bool {
        self.dialogs.confirm(confirm_message(message)).await
    }
}
