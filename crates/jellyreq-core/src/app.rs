use crate::config::ClientConfig;

/// The client: a transport, the page, its dialogs and the configuration.
///
/// Behaviour is split across modules, each adding an `impl` block:
/// [`crate::http`] (fetch wrapper), [`crate::action`], [`crate::tmdb`],
/// [`crate::toggles`] and [`crate::bootstrap`].
pub struct App<T, P, D> {
    pub(crate) transport: T,
    pub(crate) page: P,
    pub(crate) dialogs: D,
    pub(crate) config: ClientConfig,
}

impl<T, P, D> App<T, P, D> {
    pub fn new(transport: T, page: P, dialogs: D, config: ClientConfig) -> Self {
        Self {
            transport,
            page,
            dialogs,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }
}
