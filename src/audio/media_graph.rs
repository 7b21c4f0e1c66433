//! One Web Audio graph per channel, shared by the transport controls and the
//! spectrum display:
//!
//! `<audio>` → MediaElementSource → Analyser → Gain (volume) → destination
//!
//! Graphs live in thread-locals because the JS handles are neither `Send` nor
//! `Sync`. Every element gets its own event closures that carry the resource id
//! they were registered for, so late events from a replaced element are
//! recognised as stale by the workspace.

use leptos::prelude::*;
use quietwave_core::spectrum::FftSize;
use quietwave_core::transport::{MediaEvent, ResourceId, TransportCommand};
use quietwave_core::workspace::Channel;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, GainNode, HtmlAudioElement, MediaElementAudioSourceNode};

use crate::audio::resource::{Origin, PlayableResource};
use crate::state::AppState;
use crate::types::ToastKind;

thread_local! {
    static AUDIO_CTX: RefCell<Option<AudioContext>> = RefCell::new(None);
    static GRAPHS: RefCell<[Option<MediaGraph>; 2]> = RefCell::new([None, None]);
}

type EventHandler = Closure<dyn FnMut(web_sys::Event)>;

struct MediaGraph {
    resource: PlayableResource,
    element: HtmlAudioElement,
    source: MediaElementAudioSourceNode,
    analyser: AnalyserNode,
    gain: GainNode,
    _handlers: Vec<EventHandler>,
}

impl Drop for MediaGraph {
    fn drop(&mut self) {
        let el = &self.element;
        let _ = el.pause();
        el.set_onloadedmetadata(None);
        el.set_ontimeupdate(None);
        el.set_onended(None);
        el.set_onerror(None);
        let _ = self.source.disconnect();
        let _ = self.analyser.disconnect();
        let _ = self.gain.disconnect();
        // Detach the element from its URL so the browser can drop its buffers.
        let _ = el.remove_attribute("src");
        el.load();
        log::debug!("released media graph for resource {}", self.resource.id());
    }
}

fn audio_context() -> Result<AudioContext, JsValue> {
    AUDIO_CTX.with(|c| {
        let mut slot = c.borrow_mut();
        if let Some(ctx) = slot.as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = AudioContext::new()?;
        *slot = Some(ctx.clone());
        Ok(ctx)
    })
}

fn dispatch(state: AppState, channel: Channel, id: ResourceId, event: MediaEvent) {
    let error = match &event {
        MediaEvent::Error { message } => Some(message.clone()),
        _ => None,
    };
    let applied = state
        .workspace
        .try_update(|w| w.handle_media_event(channel, id, event))
        .unwrap_or(false);
    if let (true, Some(message)) = (applied, error) {
        log::error!("{} playback failed: {message}", channel.heading());
        state.notify(ToastKind::Error, "Playback Error", format!("{}: {message}", channel.heading()));
    }
}

fn media_error_message(el: &HtmlAudioElement) -> String {
    match el.error() {
        Some(err) => {
            let detail = err.message();
            let kind = match err.code() {
                1 => "playback aborted",
                2 => "network error",
                3 => "could not decode audio",
                4 => "format not supported",
                _ => "unknown media error",
            };
            if detail.is_empty() { kind.to_string() } else { format!("{kind} ({detail})") }
        }
        None => "unknown media error".to_string(),
    }
}

fn build(
    state: AppState,
    channel: Channel,
    resource: &PlayableResource,
    fft: FftSize,
    volume: f64,
) -> Result<MediaGraph, JsValue> {
    let id = resource.id();
    let element = HtmlAudioElement::new()?;
    if resource.origin() == Origin::Remote {
        // Analysing a cross-origin stream needs CORS, otherwise the analyser reads zeros.
        element.set_cross_origin(Some("anonymous"));
    }
    element.set_preload("auto");
    element.set_src(resource.url());

    let ctx = audio_context()?;
    let source = ctx.create_media_element_source(&element)?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(fft.get());
    let gain = ctx.create_gain()?;
    gain.gain().set_value(volume as f32);

    source.connect_with_audio_node(&analyser)?;
    analyser.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let on_metadata = {
        let el = element.clone();
        EventHandler::new(move |_: web_sys::Event| {
            dispatch(state, channel, id, MediaEvent::MetadataLoaded { duration_secs: el.duration() });
        })
    };
    let on_time = {
        let el = element.clone();
        EventHandler::new(move |_: web_sys::Event| {
            dispatch(state, channel, id, MediaEvent::TimeUpdate { current_time_secs: el.current_time() });
        })
    };
    let on_ended = EventHandler::new(move |_: web_sys::Event| {
        dispatch(state, channel, id, MediaEvent::Ended);
    });
    let on_error = {
        let el = element.clone();
        EventHandler::new(move |_: web_sys::Event| {
            dispatch(state, channel, id, MediaEvent::Error { message: media_error_message(&el) });
        })
    };

    element.set_onloadedmetadata(Some(on_metadata.as_ref().unchecked_ref()));
    element.set_ontimeupdate(Some(on_time.as_ref().unchecked_ref()));
    element.set_onended(Some(on_ended.as_ref().unchecked_ref()));
    element.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    Ok(MediaGraph {
        resource: resource.clone(),
        element,
        source,
        analyser,
        gain,
        _handlers: vec![on_metadata, on_time, on_ended, on_error],
    })
}

/// Point a channel at a new resource. The previous graph is torn down first.
pub fn bind(state: AppState, channel: Channel, resource: &PlayableResource, fft: FftSize, volume: f64) {
    release(channel);
    match build(state, channel, resource, fft, volume) {
        Ok(graph) => {
            log::info!("{} bound to resource {}", channel.heading(), resource.id());
            GRAPHS.with(|g| g.borrow_mut()[channel.index()] = Some(graph));
        }
        Err(e) => {
            log::error!("failed to build audio graph for {}: {:?}", channel.heading(), e);
            dispatch(
                state,
                channel,
                resource.id(),
                MediaEvent::Error { message: "audio output unavailable".to_string() },
            );
        }
    }
}

pub fn release(channel: Channel) {
    // Take first so the graph drops outside the borrow.
    let old = GRAPHS.with(|g| g.borrow_mut()[channel.index()].take());
    drop(old);
}

fn with_graph<T>(channel: Channel, f: impl FnOnce(&MediaGraph) -> T) -> Option<T> {
    GRAPHS.with(|g| g.borrow()[channel.index()].as_ref().map(f))
}

/// Carry out what the transport decided.
pub fn apply(state: AppState, channel: Channel, command: TransportCommand) {
    match command {
        TransportCommand::None => {}
        TransportCommand::Pause => {
            with_graph(channel, |g| {
                if let Err(e) = g.element.pause() {
                    log::warn!("pause failed: {:?}", e);
                }
            });
        }
        TransportCommand::Play { from_secs } => {
            // Browsers start contexts suspended until a user gesture; this is one.
            if let Ok(ctx) = audio_context() {
                let _ = ctx.resume();
            }
            let started = with_graph(channel, |g| {
                let el = &g.element;
                if (el.current_time() - from_secs).abs() > 0.01 {
                    el.set_current_time(from_secs);
                }
                (g.resource.id(), el.play())
            });
            let Some((id, play)) = started else { return };
            match play {
                Ok(promise) => {
                    wasm_bindgen_futures::spawn_local(async move {
                        if let Err(e) = JsFuture::from(promise).await {
                            log::warn!("play() rejected: {:?}", e);
                            dispatch(state, channel, id, MediaEvent::PlayRejected);
                        }
                    });
                }
                Err(e) => {
                    log::warn!("play() threw: {:?}", e);
                    dispatch(state, channel, id, MediaEvent::PlayRejected);
                }
            }
        }
    }
}

pub fn seek(channel: Channel, secs: f64) {
    with_graph(channel, |g| g.element.set_current_time(secs));
}

pub fn set_volume(channel: Channel, volume: f64) {
    with_graph(channel, |g| g.gain.gain().set_value(volume as f32));
}

/// Fill `bins` with the analyser's current byte spectrum. False when the channel has no graph.
pub fn read_frequency_data(channel: Channel, bins: &mut [u8]) -> bool {
    with_graph(channel, |g| {
        if g.analyser.frequency_bin_count() as usize != bins.len() {
            return false;
        }
        g.analyser.get_byte_frequency_data(bins);
        true
    })
    .unwrap_or(false)
}

/// Keep a channel's graph in step with the workspace: rebinds whenever the
/// channel's resource changes and releases on unmount.
pub fn sync_channel(state: AppState, channel: Channel) {
    let resource = Memo::new(move |_| state.resource(channel));
    let fft = state.config.with_value(|c| c.fft());

    Effect::new(move || match resource.get() {
        Some(res) => {
            let volume = state
                .workspace
                .with_untracked(|w| w.transport(channel).transport().volume);
            bind(state, channel, &res, fft, volume);
        }
        None => release(channel),
    });

    on_cleanup(move || release(channel));
}
