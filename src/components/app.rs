use leptos::prelude::*;
use quietwave_core::workspace::Channel;

use crate::audio::export;
use crate::components::audio_controls::AudioControls;
use crate::components::comparison::ComparisonSlider;
use crate::components::file_uploader::FileUploader;
use crate::components::header::Header;
use crate::components::spectrum::SpectrumView;
use crate::components::statistics::Statistics;
use crate::components::toasts::Toasts;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::types::ToastKind;

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let state = AppState::new(config);
    provide_context(state);

    view! {
        <div class="app">
            <Header />
            <main class="main">
                <section class="hero">
                    <h1>"Eliminate Noise from Your Audio"</h1>
                    <p>"Upload a recording, then listen to the original and the denoised version side by side."</p>
                </section>

                <section class="panel">
                    <h2>"Upload Your Audio"</h2>
                    <FileUploader />
                </section>

                <section class="channels">
                    <ChannelColumn channel=Channel::Original />
                    <ChannelColumn channel=Channel::Denoised />
                </section>

                <section class="compare">
                    <h3>"Compare Results"</h3>
                    <ComparisonSlider />
                    <DownloadButton />
                </section>

                <Statistics />
            </main>
            <Toasts />
        </div>
    }
}

#[component]
fn ChannelColumn(channel: Channel) -> impl IntoView {
    view! {
        <div class="channel">
            <h3>{channel.heading()}</h3>
            <SpectrumView channel=channel />
            <AudioControls channel=channel />
        </div>
    }
}

#[component]
fn DownloadButton() -> impl IntoView {
    let state = expect_context::<AppState>();
    let ready = move || state.resource(Channel::Denoised).is_some();

    let on_download = move |_| {
        let suffix = state.config.with_value(|c| c.export_suffix.clone());
        let target = state.workspace.with_untracked(|w| {
            let name = w.export_name(&suffix)?;
            Some((w.resource(Channel::Denoised)?.clone(), name))
        });
        let Some((resource, filename)) = target else { return };
        match export::download(&resource, &filename) {
            Ok(()) => state.notify(ToastKind::Success, "Download Started", format!("Downloading {filename}")),
            Err(e) => {
                log::error!("download failed: {e}");
                state.notify(ToastKind::Error, "Download Failed", e);
            }
        }
    };

    view! {
        <div class="download-row">
            <button class="download-btn" disabled=move || !ready() on:click=on_download>
                "Download Processed Audio"
            </button>
        </div>
    }
}
