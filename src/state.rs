use leptos::prelude::*;
use quietwave_core::workspace::{Channel, Workspace};

use crate::audio::resource::PlayableResource;
use crate::config::AppConfig;
use crate::types::{StatsPanel, Toast, ToastKind};

const TOAST_LIFETIME_MS: u32 = 4000;

#[derive(Clone, Copy)]
pub struct AppState {
    pub workspace: RwSignal<Workspace<PlayableResource>>,
    pub toasts: RwSignal<Vec<Toast>>,
    next_toast_id: RwSignal<u64>,
    pub stats: RwSignal<StatsPanel>,
    pub config: StoredValue<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            workspace: RwSignal::new(Workspace::new(config.default_volume)),
            toasts: RwSignal::new(Vec::new()),
            next_toast_id: RwSignal::new(0),
            stats: RwSignal::new(StatsPanel::default()),
            config: StoredValue::new(config),
        }
    }

    /// Resource currently bound to a channel, tracked.
    pub fn resource(&self, channel: Channel) -> Option<PlayableResource> {
        self.workspace.with(|w| w.resource(channel).cloned())
    }

    pub fn is_loading(&self) -> bool {
        self.workspace.with(|w| w.is_loading())
    }

    pub fn notify(&self, kind: ToastKind, title: &str, description: impl Into<String>) {
        let id = self.next_toast_id.get_untracked();
        self.next_toast_id.set(id + 1);
        self.toasts.update(|t| {
            t.push(Toast {
                id,
                title: title.to_string(),
                description: description.into(),
                kind,
            })
        });

        let toasts = self.toasts;
        let dismiss = wasm_bindgen::closure::Closure::once_into_js(move || {
            let _ = toasts.try_update(|t| t.retain(|x| x.id != id));
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                wasm_bindgen::JsCast::unchecked_ref(&dismiss),
                TOAST_LIFETIME_MS as i32,
            );
        }
    }

    pub fn dismiss_toast(&self, id: u64) {
        self.toasts.update(|t| t.retain(|x| x.id != id));
    }
}
