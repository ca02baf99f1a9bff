use jellyreq_core::Page;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// [`Page`] over the live document.
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    /// First match for `selector`; invalid selectors count as no match.
    pub fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// Every element matching `selector`.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            tracing::warn!(selector, "invalid selector");
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl Page for DomPage {
    fn meta_content(&self, name: &str) -> Option<String> {
        self.query(&format!("meta[name=\"{name}\"]"))?
            .get_attribute("content")
    }

    fn text(&self, id: &str) -> Option<String> {
        match self.html_element(id) {
            Some(element) => Some(element.inner_text()),
            None => self.document.get_element_by_id(id)?.text_content(),
        }
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        if let Some(element) = self.html_element(id) {
            element.set_inner_text(text);
            return true;
        }
        match self.document.get_element_by_id(id) {
            Some(element) => {
                element.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        match self.document.get_element_by_id(id) {
            Some(element) => {
                element.remove();
                true
            }
            None => false,
        }
    }

    fn set_display(&self, id: &str, visible: bool) -> bool {
        let Some(element) = self.html_element(id) else {
            return false;
        };
        let display = if visible { "block" } else { "none" };
        element.style().set_property("display", display).is_ok()
    }

    fn toggle_body_class(&self, class: &str) -> bool {
        self.document
            .body()
            .and_then(|body| body.class_list().toggle(class).ok())
            .unwrap_or(false)
    }

    fn toggle_class(&self, selector: &str, class: &str) -> Option<bool> {
        self.query(selector)?.class_list().toggle(class).ok()
    }

    fn exists(&self, selector: &str) -> bool {
        self.query(selector).is_some()
    }
}
