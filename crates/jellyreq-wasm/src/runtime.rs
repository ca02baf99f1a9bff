use std::cell::RefCell;
use std::rc::Rc;

use jellyreq_api::HttpTransport;
use jellyreq_core::{App, ClientConfig, Runtime};
use wasm_bindgen::JsValue;

use crate::dialogs::PageDialogs;
use crate::dom::DomPage;
use crate::logging;

/// `<script type="application/toml" id="jellyreq-config">` holding overrides.
const CONFIG_ELEMENT: &str = "jellyreq-config";

pub type WebRuntime = Runtime<HttpTransport, DomPage, PageDialogs>;

thread_local! {
    static RUNTIME: RefCell<Option<Rc<WebRuntime>>> = const { RefCell::new(None) };
}

pub(crate) fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// The page's runtime, built from the inline config on first use.
pub fn runtime() -> Result<Rc<WebRuntime>, JsValue> {
    if let Some(rt) = RUNTIME.with(|cell| cell.borrow().clone()) {
        return Ok(rt);
    }
    let rt = Rc::new(build(page_config())?);
    RUNTIME.with(|cell| *cell.borrow_mut() = Some(rt.clone()));
    Ok(rt)
}

/// Rebuild the runtime from the defaults overlaid with `overlay`. The
/// overlay's `[logging] level` applies from here on.
pub fn configure(overlay: &str) -> Result<(), JsValue> {
    let config = ClientConfig::merge_toml(overlay).map_err(|e| js_error(&e.to_string()))?;
    logging::init(&config.logging.level);
    let rt = Rc::new(build(config)?);
    let previous = RUNTIME.with(|cell| cell.borrow_mut().replace(rt));
    if let Some(previous) = previous {
        previous.close_modal();
    }
    tracing::info!("configuration replaced");
    Ok(())
}

/// Defaults overlaid with the page's config block, with logging set up from
/// the result.
fn page_config() -> ClientConfig {
    let overlay = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT))
        .and_then(|element| element.text_content());
    let (config, err) = match overlay.map(|overlay| ClientConfig::merge_toml(&overlay)) {
        None => (ClientConfig::default(), None),
        Some(Ok(config)) => (config, None),
        Some(Err(err)) => (ClientConfig::default(), Some(err)),
    };
    logging::init(&config.logging.level);
    if let Some(err) = err {
        tracing::error!(%err, "ignoring invalid page configuration");
    }
    config
}

fn build(config: ClientConfig) -> Result<WebRuntime, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| js_error("window has no document"))?;
    let base = window.location().href()?;
    let transport = HttpTransport::new(&base).map_err(|e| js_error(&e.to_string()))?;
    let dialogs = PageDialogs::new(window, config.dialogs.style)?;
    tracing::debug!(%base, style = ?config.dialogs.style, "runtime ready");
    Ok(Runtime::new(App::new(
        transport,
        DomPage::new(document),
        dialogs,
        config,
    )))
}
