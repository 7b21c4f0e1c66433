use leptos::prelude::*;
use quietwave_core::analysis::AudioStats;
use quietwave_core::transport::format_time;

use crate::state::AppState;

fn db(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.1} dBFS"),
        None => "silent".to_string(),
    }
}

fn hz(v: Option<f64>) -> String {
    match v {
        Some(v) if v >= 1000.0 => format!("{:.2} kHz", v / 1000.0),
        Some(v) => format!("{v:.0} Hz"),
        None => "n/a".to_string(),
    }
}

fn rows(stats: &AudioStats) -> Vec<(&'static str, String)> {
    vec![
        ("Duration", format_time(stats.duration_secs)),
        (
            "Format",
            format!(
                "{} Hz, {}",
                stats.sample_rate,
                if stats.channels == 1 { "mono".to_string() } else { format!("{} ch", stats.channels) }
            ),
        ),
        ("Peak", db(stats.peak_dbfs)),
        ("RMS level", db(stats.rms_dbfs)),
        ("Noise floor", db(stats.noise_floor_dbfs)),
        ("Spectral centroid", hz(stats.spectral_centroid_hz)),
    ]
}

#[component]
fn StatsCard(heading: &'static str, stats: Option<AudioStats>) -> impl IntoView {
    let body = match stats {
        Some(s) => rows(&s)
            .into_iter()
            .map(|(label, value)| view! {
                <div class="stat-row">
                    <span class="stat-label">{label}</span>
                    <span class="stat-value">{value}</span>
                </div>
            })
            .collect_view()
            .into_any(),
        None => view! { <p class="stat-empty">"No data"</p> }.into_any(),
    };
    view! {
        <div class="stats-card">
            <h4>{heading}</h4>
            {body}
        </div>
    }
}

#[component]
pub fn Statistics() -> impl IntoView {
    let state = expect_context::<AppState>();
    let panel = move || state.stats.get();

    let floor_change = move || {
        let p = state.stats.get();
        let before = p.original.as_ref()?.1.noise_floor_dbfs?;
        let after = p.denoised.as_ref()?.1.noise_floor_dbfs?;
        Some(format!("{:+.1} dB", after - before))
    };

    view! {
        <section class="statistics">
            <h3>"Statistics"</h3>
            {move || panel().computing.then(|| view! { <p class="stats-computing">"Analysing audio..."</p> })}
            <div class="stats-grid">
                {move || view! { <StatsCard heading="Original" stats=panel().original.map(|(_, s)| s) /> }}
                {move || view! { <StatsCard heading="Denoised" stats=panel().denoised.map(|(_, s)| s) /> }}
                <div class="stats-card summary">
                    <h4>"Comparison"</h4>
                    <div class="stat-row">
                        <span class="stat-label">"Signal-to-noise ratio"</span>
                        <span class="stat-value">{move || panel().snr.map(|s| s.label()).unwrap_or_else(|| "n/a".to_string())}</span>
                    </div>
                    <div class="stat-row">
                        <span class="stat-label">"Noise floor change"</span>
                        <span class="stat-value">{move || floor_change().unwrap_or_else(|| "n/a".to_string())}</span>
                    </div>
                </div>
            </div>
        </section>
    }
}
