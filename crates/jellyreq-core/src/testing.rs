//! Recording fakes for the host traits.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::app::App;
use crate::config::ClientConfig;
use crate::http::{HttpRequest, HttpResponse};
use crate::traits::{Dialogs, Page, Timer, Transport};

/// Ordered record of side effects shared by the fakes of one app.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct FakeError(String);

#[derive(Debug)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    replies: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<HttpRequest>>,
    hang: bool,
    timer_fires: bool,
    log: EventLog,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, status: u16, body: &str) -> Self {
        self.replies.borrow_mut().push_back(Reply::Respond(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    /// Never answer.
    pub(crate) fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Make every timer sleep complete immediately.
    pub(crate) fn with_timer_firing(mut self) -> Self {
        self.timer_fires = true;
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.log.events()
    }

    /// Parsed JSON body of the `index`-th request.
    pub(crate) fn body(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.borrow();
        serde_json::from_str(requests[index].body.as_deref().unwrap_or("null")).unwrap()
    }
}

impl Transport for FakeTransport {
    type Error = FakeError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FakeError> {
        self.log
            .push(format!("send {} {}", request.method, request.url));
        self.requests.borrow_mut().push(request);
        if self.hang {
            return std::future::pending().await;
        }
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(FakeError(message)),
            None => Err(FakeError("no scripted reply".into())),
        }
    }
}

impl Timer for FakeTransport {
    async fn sleep(&self, _duration: Duration) {
        if !self.timer_fires {
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    text: String,
    visible: bool,
    classes: BTreeSet<String>,
}

/// Elements are keyed by id, or by the full selector for non-id lookups.
#[derive(Debug, Default)]
pub(crate) struct FakePage {
    meta: HashMap<String, String>,
    elements: RefCell<HashMap<String, Element>>,
    body_classes: RefCell<BTreeSet<String>>,
    log: EventLog,
}

impl FakePage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.insert(name.to_string(), content.to_string());
        self
    }

    pub(crate) fn with_element(self, key: &str, text: &str) -> Self {
        self.elements.borrow_mut().insert(
            key.to_string(),
            Element {
                text: text.to_string(),
                ..Default::default()
            },
        );
        self
    }

    /// The modal and its three text fields.
    pub(crate) fn with_modal(self) -> Self {
        self.with_element("tmdbModal", "")
            .with_element("modal-title", "")
            .with_element("modal-overview", "")
            .with_element("modal-release-date", "")
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.elements.borrow().contains_key(key)
    }

    pub(crate) fn text_of(&self, key: &str) -> Option<String> {
        self.elements.borrow().get(key).map(|e| e.text.clone())
    }

    pub(crate) fn is_visible(&self, key: &str) -> bool {
        self.elements.borrow().get(key).is_some_and(|e| e.visible)
    }

    pub(crate) fn has_class(&self, key: &str, class: &str) -> bool {
        self.elements
            .borrow()
            .get(key)
            .is_some_and(|e| e.classes.contains(class))
    }

    pub(crate) fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.borrow().contains(class)
    }
}

fn toggle(classes: &mut BTreeSet<String>, class: &str) -> bool {
    if classes.remove(class) {
        false
    } else {
        classes.insert(class.to_string());
        true
    }
}

impl Page for FakePage {
    fn meta_content(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned()
    }

    fn text(&self, id: &str) -> Option<String> {
        self.text_of(id)
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        match self.elements.borrow_mut().get_mut(id) {
            Some(element) => {
                element.text = text.to_string();
                self.log.push(format!("text {id}={text}"));
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        let removed = self.elements.borrow_mut().remove(id).is_some();
        if removed {
            self.log.push(format!("remove {id}"));
        }
        removed
    }

    fn set_display(&self, id: &str, visible: bool) -> bool {
        match self.elements.borrow_mut().get_mut(id) {
            Some(element) => {
                element.visible = visible;
                self.log
                    .push(format!("{} {id}", if visible { "show" } else { "hide" }));
                true
            }
            None => false,
        }
    }

    fn toggle_body_class(&self, class: &str) -> bool {
        toggle(&mut self.body_classes.borrow_mut(), class)
    }

    fn toggle_class(&self, selector: &str, class: &str) -> Option<bool> {
        self.elements
            .borrow_mut()
            .get_mut(selector)
            .map(|element| toggle(&mut element.classes, class))
    }

    fn exists(&self, selector: &str) -> bool {
        self.has(selector.strip_prefix('#').unwrap_or(selector))
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDialogs {
    prompts: RefCell<VecDeque<Option<String>>>,
    confirms: RefCell<VecDeque<bool>>,
    alerts: RefCell<Vec<String>>,
    confirm_messages: RefCell<Vec<String>>,
    prompt_count: Cell<usize>,
    log: EventLog,
}

impl FakeDialogs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue prompt answers in order. Unanswered prompts are dismissed.
    pub(crate) fn answer_prompts(self, answers: &[&str]) -> Self {
        self.prompts
            .borrow_mut()
            .extend(answers.iter().map(|a| Some(a.to_string())));
        self
    }

    pub(crate) fn dismiss_prompt(self) -> Self {
        self.prompts.borrow_mut().push_back(None);
        self
    }

    /// Queue one confirm answer. Unanswered confirms are accepted.
    pub(crate) fn answer_confirm(self, accept: bool) -> Self {
        self.confirms.borrow_mut().push_back(accept);
        self
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub(crate) fn confirm_messages(&self) -> Vec<String> {
        self.confirm_messages.borrow().clone()
    }

    pub(crate) fn prompt_count(&self) -> usize {
        self.prompt_count.get()
    }
}

impl Dialogs for FakeDialogs {
    async fn alert(&self, message: &str) {
        self.log.push(format!("alert {message}"));
        self.alerts.borrow_mut().push(message.to_string());
    }

    async fn confirm(&self, message: &str) -> bool {
        self.confirm_messages.borrow_mut().push(message.to_string());
        self.confirms.borrow_mut().pop_front().unwrap_or(true)
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        self.log.push(format!("prompt {message}"));
        self.prompt_count.set(self.prompt_count.get() + 1);
        self.prompts.borrow_mut().pop_front().flatten()
    }
}

pub(crate) type TestApp = App<FakeTransport, FakePage, FakeDialogs>;

pub(crate) fn app(page: FakePage) -> TestApp {
    app_with(FakeTransport::new(), page, FakeDialogs::new())
}

pub(crate) fn app_with(transport: FakeTransport, page: FakePage, dialogs: FakeDialogs) -> TestApp {
    app_with_config(transport, page, dialogs, ClientConfig::default())
}

/// Wire the fakes to one shared [`EventLog`].
pub(crate) fn app_with_config(
    mut transport: FakeTransport,
    mut page: FakePage,
    mut dialogs: FakeDialogs,
    config: ClientConfig,
) -> TestApp {
    let log = EventLog::default();
    transport.log = log.clone();
    page.log = log.clone();
    dialogs.log = log;
    App::new(transport, page, dialogs, config)
}
