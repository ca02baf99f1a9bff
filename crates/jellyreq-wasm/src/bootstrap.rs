use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use jellyreq_core::{confirm_message, Binding};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{DocumentReadyState, Element, HtmlElement};

use crate::runtime::{js_error, runtime, WebRuntime};

/// Set on a confirm button for the re-dispatched click that the user
/// already agreed to.
const CONFIRMED_ATTR: &str = "data-confirmed";
const MESSAGE_ATTR: &str = "data-message";

/// Run `f` once the document has been parsed.
pub fn on_ready(f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| js_error("no document"))?;
    if document.ready_state() == DocumentReadyState::Loading {
        EventListener::once(&document, "DOMContentLoaded", move |_| f()).forget();
    } else {
        f();
    }
    Ok(())
}

/// Attach the page's click listeners. Listeners live as long as the page.
pub fn attach() -> Result<(), JsValue> {
    let rt = runtime()?;
    let page = rt.app().page();
    for (binding, selector) in rt.app().bindings() {
        let targets = if binding.all_matches() {
            page.query_all(&selector)
        } else {
            page.query(&selector).into_iter().collect()
        };
        tracing::debug!(?binding, %selector, count = targets.len(), "binding");
        for target in targets {
            listen(binding, target);
        }
    }
    Ok(())
}

fn listen(binding: Binding, target: Element) {
    match binding {
        Binding::ConfirmButton => confirm_button(target),
        Binding::CloseModal => EventListener::new(&target, "click", |_| {
            with_runtime(|rt| rt.close_modal());
        })
        .forget(),
        other => EventListener::new(&target, "click", move |_| {
            with_runtime(|rt| {
                rt.app().dispatch(other);
            });
        })
        .forget(),
    }
}

/// What a confirm button's click does before the page's own handlers see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Let the click through untouched.
    Pass,
    /// Cancel the default action.
    Block,
    /// Swallow the click and replay it once the user has answered.
    Defer,
}

/// `answer_now` is the synchronous answer when the dialogs can give one.
fn gate(replayed: bool, answer_now: impl FnOnce() -> Option<bool>) -> Gate {
    if replayed {
        return Gate::Pass;
    }
    match answer_now() {
        Some(true) => Gate::Pass,
        Some(false) => Gate::Block,
        None => Gate::Defer,
    }
}

/// Ask the user to confirm the button's `data-message` before the click
/// takes effect.
///
/// With native dialogs the answer is synchronous and a declined click only
/// loses its default action. Inline dialogs answer later: the first click is
/// stopped before any other listener runs (the listener is on the capture
/// phase, which fires first at the target), and an accepted click is replayed
/// so the button's other listeners run exactly once, on the replay.
fn confirm_button(button: Element) {
    let target = button.clone();
    let options = EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: false,
    };
    EventListener::new_with_options(&target, "click", options, move |event| {
        let replayed = button.has_attribute(CONFIRMED_ATTR);
        if replayed {
            let _ = button.remove_attribute(CONFIRMED_ATTR);
        }
        let message = button.get_attribute(MESSAGE_ATTR);
        let decision = gate(replayed, || {
            let rt = runtime().ok()?;
            let native = rt.app().dialogs().native()?;
            Some(native.confirm(confirm_message(message.as_deref())))
        });
        match decision {
            Gate::Pass => {}
            Gate::Block => {
                tracing::debug!("confirmation declined");
                event.prevent_default();
            }
            Gate::Defer => {
                event.prevent_default();
                event.stop_immediate_propagation();
                replay_after_confirm(button.clone(), message);
            }
        }
    })
    .forget();
}

fn replay_after_confirm(button: Element, message: Option<String>) {
    spawn_local(async move {
        let Ok(rt) = runtime() else {
            return;
        };
        if !rt.app().confirm_action(message.as_deref()).await {
            tracing::debug!("confirmation declined");
            return;
        }
        let Some(element) = button.dyn_ref::<HtmlElement>() else {
            return;
        };
        if button.set_attribute(CONFIRMED_ATTR, "").is_ok() {
            element.click();
        }
    });
}

/// Listeners look the runtime up per event so `configure` takes effect.
fn with_runtime(f: impl FnOnce(&WebRuntime)) {
    match runtime() {
        Ok(rt) => f(&rt),
        Err(err) => tracing::error!(?err, "runtime unavailable"),
    }
}
