use leptos::prelude::*;
use quietwave_core::intake::ACCEPT_ATTRIBUTE;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, File, HtmlInputElement};

use crate::audio::upload;
use crate::state::AppState;

fn first_dropped_file(ev: &DragEvent) -> Option<File> {
    ev.data_transfer()?.files()?.get(0)
}

#[component]
pub fn FileUploader() -> impl IntoView {
    let state = expect_context::<AppState>();
    let input_ref = NodeRef::<leptos::html::Input>::new();
    let drag_over = RwSignal::new(false);
    let loading = move || state.is_loading();

    let on_drag_enter = move |ev: DragEvent| {
        ev.prevent_default();
        if !state.is_loading() {
            drag_over.set(true);
        }
    };
    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
    };
    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        drag_over.set(false);
    };
    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        drag_over.set(false);
        if state.workspace.with_untracked(|w| w.is_loading()) {
            return;
        }
        if let Some(file) = first_dropped_file(&ev) {
            upload::submit(state, file);
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
            return;
        };
        if let Some(file) = input.files().and_then(|f| f.get(0)) {
            upload::submit(state, file);
        }
        // Allow picking the same file again.
        input.set_value("");
    };

    let on_browse = move |_| {
        if let Some(input) = input_ref.get_untracked() {
            input.click();
        }
    };

    let on_clear = move |_| {
        state.workspace.update(|w| w.clear());
        state.stats.set(Default::default());
    };

    view! {
        <div
            class="uploader"
            class:drag-over=move || drag_over.get()
            class:loading=loading
            on:dragenter=on_drag_enter
            on:dragover=on_drag_over
            on:dragleave=on_drag_leave
            on:drop=on_drop
        >
            <input
                type="file"
                class="hidden-input"
                accept=ACCEPT_ATTRIBUTE
                node_ref=input_ref
                disabled=loading
                on:change=on_change
            />
            <p class="uploader-title">
                {move || if loading() { "Processing..." } else { "Drag & drop your audio file here" }}
            </p>
            <p class="uploader-hint">"Supports WAV and MP3 formats"</p>
            <Show
                when=loading
                fallback=move || view! {
                    <button type="button" class="browse-btn" on:click=on_browse>"Browse Files"</button>
                }
            >
                <div class="processing">
                    <div class="spinner" />
                    <span>"Processing audio..."</span>
                </div>
            </Show>
            {move || {
                let name = state.workspace.with(|w| w.file_name().map(str::to_string));
                name.filter(|_| !loading()).map(|n| view! {
                    <div class="current-file">
                        <span>{n}</span>
                        <button type="button" class="clear-btn" title="Remove this file" on:click=on_clear>"✕"</button>
                    </div>
                })
            }}
        </div>
    }
}
