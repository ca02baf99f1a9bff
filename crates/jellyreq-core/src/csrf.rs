use crate::app::App;
use crate::traits::Page;

impl<T, P: Page, D> App<T, P, D> {
    /// Read the CSRF token from the page's `<meta>` tag.
    ///
    /// A missing or empty tag is logged; the caller sends the request
    /// without the header and the server rejects it.
    pub fn csrf_token(&self) -> Option<String> {
        let token = self
            .page
            .meta_content(&self.config.csrf.meta_name)
            .filter(|token| !token.is_empty());
        if token.is_none() {
            tracing::error!(meta = %self.config.csrf.meta_name, "CSRF token not found");
        }
        token
    }
}
