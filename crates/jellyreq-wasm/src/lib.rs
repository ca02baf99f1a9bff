//! WebAssembly entry point for the jellyreq request pages.
//!
//! Loading the module attaches the page listeners. The handlers the
//! templates call inline are exported under their page names and resolve
//! with a [`Report`] object.

mod bootstrap;
mod dialogs;
mod dom;
mod logging;
mod runtime;

use jellyreq_core::{DownloadAction, Report};
use wasm_bindgen::prelude::*;

use crate::runtime::{js_error, runtime};

fn to_js(report: Report) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&report)?)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    bootstrap::on_ready(|| {
        if let Err(err) = bootstrap::attach() {
            web_sys::console::error_2(&JsValue::from_str("jellyreq failed to start:"), &err);
        }
    })
}

#[wasm_bindgen(js_name = handleAction)]
pub async fn handle_action(url: String, hash: String, new_state: String) -> Result<JsValue, JsValue> {
    let rt = runtime()?;
    to_js(rt.handle_action(&url, &hash, &new_state).await)
}

/// `action` is `pause`, `resume` or `remove`.
#[wasm_bindgen(js_name = downloadAction)]
pub async fn download_action(action: String, hash: String) -> Result<JsValue, JsValue> {
    let action: DownloadAction = action.parse().map_err(|e| js_error(&format!("{e}")))?;
    let rt = runtime()?;
    to_js(rt.download_action(action, &hash).await)
}

#[wasm_bindgen(js_name = searchTmdb)]
pub async fn search_tmdb() -> Result<JsValue, JsValue> {
    let rt = runtime()?;
    to_js(rt.search().await)
}

#[wasm_bindgen(js_name = confirmTmdb)]
pub async fn confirm_tmdb() -> Result<JsValue, JsValue> {
    let rt = runtime()?;
    to_js(rt.confirm().await)
}

#[wasm_bindgen(js_name = rejectTmdb)]
pub async fn reject_tmdb() -> Result<JsValue, JsValue> {
    let rt = runtime()?;
    to_js(rt.reject().await)
}

#[wasm_bindgen(js_name = openModal)]
pub fn open_modal() -> Result<(), JsValue> {
    runtime()?.app().open_modal();
    Ok(())
}

#[wasm_bindgen(js_name = closeModal)]
pub fn close_modal() -> Result<(), JsValue> {
    runtime()?.close_modal();
    Ok(())
}

/// Returns whether dark mode is now on.
#[wasm_bindgen(js_name = toggleDarkMode)]
pub fn toggle_dark_mode() -> Result<bool, JsValue> {
    Ok(runtime()?.app().toggle_dark_mode())
}

/// Returns whether the menu is now open, or `undefined` without a menu.
#[wasm_bindgen(js_name = toggleMenu)]
pub fn toggle_menu() -> Result<Option<bool>, JsValue> {
    Ok(runtime()?.app().toggle_menu())
}

/// Replace the configuration with the defaults overlaid by `toml`.
#[wasm_bindgen]
pub fn configure(toml: &str) -> Result<(), JsValue> {
    runtime::configure(toml)
}
