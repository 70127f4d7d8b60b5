//! Transient notifications for the chat view.

use leptos::prelude::*;

use crate::state::notifications::{Notification, NotificationKind, NotificationState};

/// Push a notification and schedule its dismissal after `timeout_ms`.
pub fn notify(
    notifications: RwSignal<NotificationState>,
    kind: NotificationKind,
    text: impl Into<String>,
    timeout_ms: u32,
) -> Option<u64> {
    let id = notifications.try_update(|n| n.push(kind, text))?;

    #[cfg(feature = "csr")]
    gloo_timers::callback::Timeout::new(timeout_ms, move || {
        let _ = notifications.try_update(|n| n.dismiss(id));
    })
    .forget();
    #[cfg(not(feature = "csr"))]
    let _ = timeout_ms;

    Some(id)
}

/// Stack of notifications; clicking one dismisses it early.
#[component]
pub fn NotificationStack() -> impl IntoView {
    let notifications = expect_context::<RwSignal<NotificationState>>();

    view! {
        <div class="notification-stack">
            <For
                each=move || notifications.with(|n| n.items.clone())
                key=|n: &Notification| n.id
                children=move |n: Notification| {
                    let id = n.id;
                    view! {
                        <div
                            class=n.kind.css_class()
                            role="status"
                            on:click=move |_| {
                                notifications.update(|s| {
                                    s.dismiss(id);
                                });
                            }
                        >
                            {n.text}
                        </div>
                    }
                }
            />
        </div>
    }
}
