//! DOM access for the server-rendered chat page.
//!
//! This is the only place that knows the page's element ids and attributes.
//! Everything downstream receives plain values through [`RawPageContext`]
//! and [`crate::state::session::ChatSession`]. Requires a browser environment.

use wasm_bindgen::JsCast;

use crate::config::DATA_KEYS;
use crate::state::session::RawPageContext;

const CHAT_ID_ELEMENT: &str = "chat-id";
const MESSAGES_CONTAINER: &str = "messages-container";
const INITIAL_MESSAGES_ELEMENT: &str = "initial-messages";
const USER_ROOT_SELECTOR: &str = "[data-user-id]";
const CSRF_META_SELECTOR: &str = "meta[name=\"csrf-token\"]";

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

/// Collect the identifiers and overrides the chat needs from the page.
pub fn read_page_context() -> RawPageContext {
    let Some(doc) = document() else {
        return RawPageContext::default();
    };

    let chat_id = doc
        .get_element_by_id(CHAT_ID_ELEMENT)
        .and_then(|el| el.get_attribute("value").or_else(|| el.text_content()));

    let user_root = doc.query_selector(USER_ROOT_SELECTOR).ok().flatten();
    let user_id = user_root
        .as_ref()
        .and_then(|el| el.get_attribute("data-user-id"));
    let username = user_root
        .as_ref()
        .and_then(|el| el.get_attribute("data-username"));

    let csrf_token = doc
        .query_selector(CSRF_META_SELECTOR)
        .ok()
        .flatten()
        .and_then(|el| el.get_attribute("content"));

    let container = doc.get_element_by_id(MESSAGES_CONTAINER);
    let dataset = container
        .as_ref()
        .map(|el| {
            DATA_KEYS
                .iter()
                .filter_map(|key| {
                    el.get_attribute(&format!("data-{key}"))
                        .map(|value| ((*key).to_owned(), value))
                })
                .collect()
        })
        .unwrap_or_default();

    let initial_messages = doc
        .get_element_by_id(INITIAL_MESSAGES_ELEMENT)
        .and_then(|el| el.text_content());

    RawPageContext {
        chat_id,
        user_id,
        username,
        csrf_token,
        has_messages_container: container.is_some(),
        dataset,
        initial_messages,
    }
}

/// The element the chat panel mounts into.
pub fn messages_container() -> Option<web_sys::HtmlElement> {
    document()?
        .get_element_by_id(MESSAGES_CONTAINER)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

/// Remove server-rendered placeholder content before mounting.
pub fn clear_children(el: &web_sys::Element) {
    while let Some(child) = el.first_child() {
        if el.remove_child(&child).is_err() {
            break;
        }
    }
}

pub fn scroll_to_end(el: &web_sys::Element) {
    el.set_scroll_top(el.scroll_height());
}

/// Collapse `el`, then size it to its content height as adjusted by `fit`.
pub fn fit_height(el: &web_sys::HtmlElement, fit: impl FnOnce(i32) -> i32) {
    let style = el.style();
    let _ = style.set_property("height", "auto");
    let _ = style.set_property("height", &format!("{}px", fit(el.scroll_height())));
}
