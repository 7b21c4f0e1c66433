use leptos::prelude::*;

use crate::state::AppState;

#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<AppState>();
    let show_about = RwSignal::new(false);
    let backend = state.config.with_value(|c| match &c.processing_endpoint {
        Some(endpoint) => format!("Processing service: {endpoint}"),
        None => "Processing: simulated (returns the input unchanged)".to_string(),
    });

    view! {
        <header class="header">
            <span
                class="header-brand"
                on:click=move |_| show_about.set(true)
                title="About quietwave"
            ><b>"quiet"</b><i>"wave"</i></span>

            <div style="flex: 1;"></div>

            <button class="header-about-btn" on:click=move |_| show_about.set(true)>"About"</button>

            {move || show_about.get().then(|| {
                let backend = backend.clone();
                view! {
                    <div class="about-overlay" on:click=move |_| show_about.set(false)>
                        <div class="about-dialog" on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()>
                            <div class="about-header">
                                <span class="about-title"><b>"quiet"</b><i>"wave"</i></span>
                                <span class="about-version">{concat!("v", env!("CARGO_PKG_VERSION"))}</span>
                            </div>
                            <p class="about-desc">"Upload a noisy recording, listen to it next to the denoised result and compare the two."</p>
                            <p class="about-backend">{backend}</p>
                            <div class="about-credits">
                                "Built with:"
                                <div class="about-credit-list">
                                    <div><a href="https://leptos.dev" target="_blank">"Leptos"</a></div>
                                    <div><a href="https://crates.io/crates/realfft" target="_blank">"RealFFT"</a></div>
                                    <div><a href="https://crates.io/crates/hound" target="_blank">"Hound"</a></div>
                                    <div><a href="https://crates.io/crates/symphonia" target="_blank">"Symphonia"</a></div>
                                </div>
                            </div>
                            <button class="about-close" on:click=move |_| show_about.set(false)>"Close"</button>
                        </div>
                    </div>
                }
            })}
        </header>
    }
}
