use leptos::prelude::*;

use crate::components::drag_capture::DragCapture;
use crate::state::AppState;

#[component]
pub fn ComparisonSlider() -> impl IntoView {
    let state = expect_context::<AppState>();
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let capture = StoredValue::new_local(None::<DragCapture>);

    let enabled = Memo::new(move |_| state.workspace.with(|w| w.reveal().is_enabled()));
    let position = Memo::new(move |_| state.workspace.with(|w| w.reveal().position()));
    let dragging = Memo::new(move |_| state.workspace.with(|w| w.reveal().is_dragging()));
    let clip_path = move || state.workspace.with(|w| w.reveal().after_clip_path());

    let end_drag = move || {
        let _ = state.workspace.try_update(|w| w.end_drag());
        capture.try_update_value(|c| c.take());
    };

    let start_drag = move || {
        if !state.workspace.try_update(|w| w.begin_drag()).unwrap_or(false) {
            return;
        }
        let on_move = move |client_x: f64| {
            let Some(el) = container_ref.get_untracked() else { return };
            let rect = el.get_bounding_client_rect();
            let _ = state.workspace.try_update(|w| w.update_drag(client_x, rect.left(), rect.width()));
        };
        capture.set_value(DragCapture::acquire(on_move, end_drag));
    };

    // The reveal can be disabled mid-drag (new upload); drop the listeners with it.
    Effect::new(move || {
        if !dragging.get() {
            capture.try_update_value(|c| c.take());
        }
    });

    on_cleanup(move || {
        capture.try_update_value(|c| c.take());
    });

    let on_mouse_down = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        start_drag();
    };
    let on_touch_start = move |_: web_sys::TouchEvent| start_drag();

    view! {
        <div
            class="comparison"
            class:disabled=move || !enabled.get()
            node_ref=container_ref
        >
            <Show
                when=move || enabled.get()
                fallback=|| view! {
                    <p class="comparison-placeholder">"Upload an audio file to see the comparison"</p>
                }
            >
                <div class="comparison-layer before">
                    <div class="comparison-label">
                        <p class="title">"Before"</p>
                        <p class="subtitle">"With Noise"</p>
                    </div>
                </div>
                <div class="comparison-layer after" style:clip-path=clip_path>
                    <div class="comparison-label">
                        <p class="title">"After"</p>
                        <p class="subtitle">"Noise Removed"</p>
                    </div>
                </div>
                <div class="comparison-divider" style:left=move || format!("{}%", position.get())>
                    <div class="comparison-line" class:active=move || dragging.get() />
                    <div
                        class="comparison-handle"
                        class:grabbing=move || dragging.get()
                        on:mousedown=on_mouse_down
                        on:touchstart=on_touch_start
                    >
                        "⇔"
                    </div>
                </div>
            </Show>
        </div>
    }
}
