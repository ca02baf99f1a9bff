use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo::events::EventListener;
use jellyreq_core::{DialogStyle, Dialogs};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, Window};

const OVERLAY_STYLE: &str = "position:fixed;inset:0;display:flex;align-items:center;\
justify-content:center;background:rgba(0,0,0,0.5);z-index:10000";
const PANEL_STYLE: &str = "min-width:18rem;max-width:90vw;padding:1rem 1.25rem;\
border-radius:6px;background:#fff;color:#222;box-shadow:0 4px 16px rgba(0,0,0,0.3)";

/// `window.alert` / `confirm` / `prompt`. These block the page until answered.
pub struct NativeDialogs {
    window: Window,
}

impl NativeDialogs {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            tracing::error!(?err, "alert failed");
        }
    }

    pub fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or_else(|err| {
            tracing::error!(?err, "confirm failed");
            false
        })
    }

    fn prompt(&self, message: &str) -> Option<String> {
        self.window.prompt_with_message(message).unwrap_or_else(|err| {
            tracing::error!(?err, "prompt failed");
            None
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Alert,
    Confirm,
    Prompt,
}

struct Answer {
    accepted: bool,
    value: Option<String>,
}

type Responder = Rc<RefCell<Option<oneshot::Sender<bool>>>>;

/// Answer for a key pressed inside a dialog. Enter only counts from the text
/// field; on a focused button the browser turns it into that button's click.
fn key_answer(key: &str, from_input: bool, kind: Kind) -> Option<bool> {
    match key {
        "Enter" if from_input => Some(true),
        // An alert has only one answer.
        "Escape" => Some(kind == Kind::Alert),
        _ => None,
    }
}

fn respond(responder: &Responder, accepted: bool) {
    if let Some(tx) = responder.borrow_mut().take() {
        let _ = tx.send(accepted);
    }
}

/// Dialogs drawn into the page. Each one is an overlay appended to `<body>`
/// and removed once answered; the page keeps running meanwhile.
pub struct InlineDialogs {
    native: NativeDialogs,
    document: Document,
}

impl InlineDialogs {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            native: NativeDialogs::new(window),
            document,
        }
    }

    fn element(&self, tag: &str, class: &str) -> Result<Element, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        Ok(element)
    }

    fn button(&self, label: &str, class: &str) -> Result<Element, JsValue> {
        let button = self.element("button", class)?;
        button.set_attribute("type", "button")?;
        button.set_text_content(Some(label));
        Ok(button)
    }

    async fn show(&self, message: &str, kind: Kind) -> Result<Answer, JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let overlay = self.element("div", "jellyreq-dialog-overlay")?;
        overlay.set_attribute("style", OVERLAY_STYLE)?;
        overlay.set_attribute("role", "dialog")?;
        overlay.set_attribute("aria-modal", "true")?;

        let panel = self.element("div", "jellyreq-dialog")?;
        panel.set_attribute("style", PANEL_STYLE)?;
        let text = self.element("p", "jellyreq-dialog-message")?;
        text.set_text_content(Some(message));
        panel.append_child(&text)?;

        let input = match kind {
            Kind::Prompt => {
                let input: HtmlInputElement = self
                    .element("input", "jellyreq-dialog-input")?
                    .dyn_into()?;
                input.set_type("text");
                panel.append_child(&input)?;
                Some(input)
            }
            _ => None,
        };

        let actions = self.element("div", "jellyreq-dialog-actions")?;
        let ok = self.button("OK", "jellyreq-dialog-ok")?;
        actions.append_child(&ok)?;
        let cancel = match kind {
            Kind::Alert => None,
            _ => {
                let cancel = self.button("Cancel", "jellyreq-dialog-cancel")?;
                actions.append_child(&cancel)?;
                Some(cancel)
            }
        };
        panel.append_child(&actions)?;
        overlay.append_child(&panel)?;
        body.append_child(&overlay)?;

        let (tx, rx) = oneshot::channel();
        let responder: Responder = Rc::new(RefCell::new(Some(tx)));

        let mut listeners = Vec::with_capacity(3);
        let r = responder.clone();
        listeners.push(EventListener::new(&ok, "click", move |_| respond(&r, true)));
        if let Some(cancel) = &cancel {
            let r = responder.clone();
            listeners.push(EventListener::new(cancel, "click", move |_| {
                respond(&r, false)
            }));
        }
        let r = responder.clone();
        listeners.push(EventListener::new(&overlay, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let from_input = event
                .target()
                .is_some_and(|target| target.has_type::<HtmlInputElement>());
            if let Some(accepted) = key_answer(&key, from_input, kind) {
                respond(&r, accepted);
            }
        }));

        let focused = match &input {
            Some(input) => input.focus(),
            None => ok.dyn_ref::<HtmlElement>().map_or(Ok(()), HtmlElement::focus),
        };
        if let Err(err) = focused {
            tracing::debug!(?err, "could not focus dialog");
        }

        let accepted = rx.await.unwrap_or(false);
        let value = input.map(|input| input.value());
        drop(listeners);
        overlay.remove();
        Ok(Answer { accepted, value })
    }
}

/// The configured dialog implementation.
pub enum PageDialogs {
    Inline(InlineDialogs),
    Native(NativeDialogs),
}

impl PageDialogs {
    /// The window dialogs, when configured. Their answers are synchronous.
    pub fn native(&self) -> Option<&NativeDialogs> {
        match self {
            Self::Native(native) => Some(native),
            Self::Inline(_) => None,
        }
    }

    pub fn new(window: Window, style: DialogStyle) -> Result<Self, JsValue> {
        Ok(match style {
            DialogStyle::Native => Self::Native(NativeDialogs::new(window)),
            DialogStyle::Inline => {
                let document = window
                    .document()
                    .ok_or_else(|| JsValue::from_str("window has no document"))?;
                Self::Inline(InlineDialogs::new(window, document))
            }
        })
    }
}

fn log_fallback(err: &JsValue) {
    tracing::warn!(?err, "inline dialog failed, using native dialog");
}

impl Dialogs for PageDialogs {
    async fn alert(&self, message: &str) {
        match self {
            Self::Native(native) => native.alert(message),
            Self::Inline(inline) => {
                if let Err(err) = inline.show(message, Kind::Alert).await {
                    log_fallback(&err);
                    inline.native.alert(message);
                }
            }
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        match self {
            Self::Native(native) => native.confirm(message),
            Self::Inline(inline) => match inline.show(message, Kind::Confirm).await {
                Ok(answer) => answer.accepted,
                Err(err) => {
                    log_fallback(&err);
                    inline.native.confirm(message)
                }
            },
        }
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        match self {
            Self::Native(native) => native.prompt(message),
            Self::Inline(inline) => match inline.show(message, Kind::Prompt).await {
                Ok(answer) if answer.accepted => answer.value,
                Ok(_) => None,
                Err(err) => {
                    log_fallback(&err);
                    inline.native.prompt(message)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_only_accepts_from_input() {
        assert_eq!(key_answer("Enter", true, Kind::Prompt), Some(true));
        assert_eq!(key_answer("Enter", false, Kind::Confirm), None);
        assert_eq!(key_answer("Enter", false, Kind::Alert), None);
    }

    #[test]
    fn test_escape_dismisses() {
        assert_eq!(key_answer("Escape", false, Kind::Confirm), Some(false));
        assert_eq!(key_answer("Escape", true, Kind::Prompt), Some(false));
        assert_eq!(key_answer("Escape", false, Kind::Alert), Some(true));
        assert_eq!(key_answer("a", true, Kind::Prompt), None);
    }
}
