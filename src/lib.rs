pub mod audio;
pub mod canvas;
pub mod components;
pub mod config;
pub mod state;
pub mod types;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let (config, warnings) = config::load();
    let _ = console_log::init_with_level(config.log_level());
    for w in &warnings {
        log::warn!("config: {w}");
    }
    log::info!("quietwave v{} starting", env!("CARGO_PKG_VERSION"));
    leptos::mount::mount_to_body(move || {
        leptos::view! { <components::app::App config=config.clone() /> }
    });
}
