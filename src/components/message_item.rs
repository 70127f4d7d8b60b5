//! One rendered chat message.

use leptos::prelude::*;

use crate::render::MessageNode;

/// Renders a [`MessageNode`]. Content and timestamp are text children only.
///
/// Animated nodes drop the `msg-appear` class once their delay plus
/// `appear_ms` has elapsed.
#[component]
pub fn MessageItem(node: MessageNode, #[prop(optional)] appear_ms: u32) -> impl IntoView {
    let animating = RwSignal::new(node.animate);

    #[cfg(feature = "csr")]
    {
        if node.animate {
            let settle_after = node.appear_delay_ms.saturating_add(appear_ms);
            gloo_timers::callback::Timeout::new(settle_after, move || {
                let _ = animating.try_set(false);
            })
            .forget();
        }
    }
    #[cfg(not(feature = "csr"))]
    let _ = appear_ms;

    let animated_class = node.class_name();
    let settled_class = node.base_class_name();
    let class = move || {
        if animating.get() {
            animated_class.clone()
        } else {
            settled_class.to_owned()
        }
    };
    let style = node.appear_style();

    view! {
        <div class=class style=style>
            <div class="message-content">
                {node.content}
                <div class="message-time">{node.timestamp}</div>
            </div>
        </div>
    }
}
