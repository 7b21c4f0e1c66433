use leptos::prelude::*;
use quietwave_core::transport::{format_time, progress_percent, PlaybackPhase};
use quietwave_core::workspace::Channel;

use crate::audio::media_graph;
use crate::state::AppState;

fn input_value(ev: &web_sys::Event) -> f64 {
    event_target_value(ev).parse().unwrap_or(f64::NAN)
}

#[component]
pub fn AudioControls(channel: Channel) -> impl IntoView {
    let state = expect_context::<AppState>();
    media_graph::sync_channel(state, channel);

    let phase = Memo::new(move |_| state.workspace.with(|w| w.transport(channel).phase()));
    let transport = Memo::new(move |_| state.workspace.with(|w| *w.transport(channel).transport()));
    let disabled = move || !state.workspace.with(|w| w.transport(channel).is_enabled());

    let title = move || {
        let name = state.workspace.with(|w| w.file_name().map(str::to_string));
        match (channel, name) {
            (Channel::Original, Some(n)) => n,
            (Channel::Denoised, Some(n)) if state.resource(Channel::Denoised).is_some() => format!("{n} (Denoised)"),
            _ => "No audio selected".to_string(),
        }
    };

    let on_toggle = move |_| {
        if let Some(cmd) = state.workspace.try_update(|w| w.toggle_play(channel)) {
            media_graph::apply(state, channel, cmd);
        }
    };

    let on_seek = move |ev: web_sys::Event| {
        let requested = input_value(&ev);
        if let Some(Some(t)) = state.workspace.try_update(|w| w.seek(channel, requested)) {
            media_graph::seek(channel, t);
        }
    };

    let on_volume = move |ev: web_sys::Event| {
        let requested = input_value(&ev);
        if let Some(v) = state.workspace.try_update(|w| w.set_volume(channel, requested)) {
            media_graph::set_volume(channel, v);
        }
    };

    let error = move || {
        state
            .workspace
            .with(|w| w.transport(channel).last_error().map(str::to_string))
    };

    view! {
        <div class="audio-controls" class:disabled=disabled>
            <div class="now-playing">
                <h4>"Now Playing"</h4>
                <p class="track-title">{title}</p>
            </div>

            <div class="transport-row">
                <button
                    class="play-btn"
                    disabled=disabled
                    title=move || if phase.get() == PlaybackPhase::Playing { "Pause" } else { "Play" }
                    on:click=on_toggle
                >
                    {move || if phase.get() == PlaybackPhase::Playing { "❚❚" } else { "▶" }}
                </button>

                <div class="seek">
                    <div class="seek-track">
                        <div
                            class="seek-fill"
                            style:width=move || format!("{}%", progress_percent(&transport.get()))
                        />
                    </div>
                    <input
                        type="range"
                        class="seek-slider"
                        min="0"
                        step="0.01"
                        max=move || transport.get().duration_secs.max(0.01)
                        prop:value=move || transport.get().current_time_secs
                        disabled=disabled
                        on:input=on_seek
                    />
                    <div class="time-labels">
                        <span>{move || format_time(transport.get().current_time_secs)}</span>
                        <span>{move || format_time(transport.get().duration_secs)}</span>
                    </div>
                </div>
            </div>

            <div class="volume-row">
                <span class="volume-icon">"🔊"</span>
                <input
                    type="range"
                    class="volume-slider"
                    min="0"
                    max="1"
                    step="0.01"
                    prop:value=move || transport.get().volume
                    disabled=disabled
                    on:input=on_volume
                />
            </div>

            {move || error().map(|msg| view! { <p class="playback-error">{msg}</p> })}
        </div>
    }
}
