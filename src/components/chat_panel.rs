//! Message list and composer for one chat.

#[cfg(test)]
#[path = "chat_panel_test.rs"]
mod chat_panel_test;

use leptos::prelude::*;

use crate::components::message_item::MessageItem;
use crate::components::typing_indicator::TypingIndicator;
use crate::render::MessageNode;
use crate::state::chat::ChatState;

/// Floor for the composer's auto-sized height.
pub const COMPOSER_MIN_HEIGHT_PX: i32 = 44;

/// Composer height for content measuring `scroll_height` pixels.
pub fn composer_height(scroll_height: i32) -> i32 {
    scroll_height.max(COMPOSER_MIN_HEIGHT_PX)
}

/// Chat panel showing the rendered messages and an input for new ones.
///
/// Enter sends; Shift+Enter inserts a newline. The send button is disabled
/// while a send is in flight. The input grows with its content and shrinks
/// back once a sent draft is cleared.
#[component]
pub fn ChatPanel(
    draft: RwSignal<String>,
    #[prop(into)] sending: Signal<bool>,
    #[prop(into)] typing_label: Signal<Option<String>>,
    on_send: Callback<()>,
    on_typing: Callback<()>,
    #[prop(optional)] appear_ms: u32,
) -> impl IntoView {
    let chat = expect_context::<RwSignal<ChatState>>();
    let messages_ref = NodeRef::<leptos::html::Div>::new();
    let input_ref = NodeRef::<leptos::html::Textarea>::new();

    Effect::new(move || {
        let _ = chat.with(ChatState::scroll_generation);

        #[cfg(feature = "csr")]
        {
            if let Some(el) = messages_ref.get() {
                crate::util::dom::scroll_to_end(&el);
            }
        }
    });

    // Every draft change, typed or cleared after a send, refits the input.
    Effect::new(move || {
        draft.track();

        #[cfg(feature = "csr")]
        {
            if let Some(el) = input_ref.get() {
                crate::util::dom::fit_height(&el, composer_height);
            }
        }
    });

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            on_send.run(());
        }
    };

    view! {
        <div class="chat-panel">
            <div class="chat-panel__messages" node_ref=messages_ref>
                <For
                    each=move || chat.with(|c| c.messages.clone())
                    key=|node: &MessageNode| node.key
                    children=move |node: MessageNode| view! { <MessageItem node appear_ms/> }
                />
            </div>
            <TypingIndicator label=typing_label/>
            <form class="chat-panel__composer" on:submit=move |ev| {
                ev.prevent_default();
                on_send.run(());
            }>
                <textarea
                    id="message-input"
                    class="chat-panel__input"
                    rows="1"
                    node_ref=input_ref
                    placeholder="Type a message..."
                    prop:value=move || draft.get()
                    on:input=move |ev| {
                        draft.set(event_target_value(&ev));
                        on_typing.run(());
                    }
                    on:keydown=on_keydown
                ></textarea>
                <button id="send-button" class="btn chat-panel__send" type="submit" disabled=move || sending.get()>
                    "Send"
                </button>
            </form>
        </div>
    }
}
