//! "X is typing..." line under the message list.

use leptos::prelude::*;

#[component]
pub fn TypingIndicator(#[prop(into)] label: Signal<Option<String>>) -> impl IntoView {
    let visible = move || label.with(Option::is_some);
    view! {
        <div class="typing-indicator" class:typing-indicator--visible=visible aria-live="polite">
            {move || label.get().unwrap_or_default()}
        </div>
    }
}
