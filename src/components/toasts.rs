use leptos::prelude::*;

use crate::state::AppState;
use crate::types::ToastKind;

#[component]
pub fn Toasts() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="toasts" role="status">
            <For
                each=move || state.toasts.get()
                key=|t| t.id
                children=move |t| {
                    let id = t.id;
                    let class = match t.kind {
                        ToastKind::Success => "toast success",
                        ToastKind::Error => "toast error",
                    };
                    view! {
                        <div class=class>
                            <div class="toast-body">
                                <p class="toast-title">{t.title}</p>
                                <p class="toast-desc">{t.description}</p>
                            </div>
                            <button class="toast-close" title="Dismiss" on:click=move |_| state.dismiss_toast(id)>"✕"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
