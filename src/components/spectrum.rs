use leptos::prelude::*;
use quietwave_core::spectrum::{FftSize, SpectrumFrame};
use quietwave_core::workspace::Channel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::audio::media_graph;
use crate::canvas::spectrum_renderer;
use crate::state::AppState;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A self-rescheduling animation-frame loop. Dropping it cancels the pending
/// frame and releases the callback, which also breaks its self-reference.
struct RenderLoop {
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

thread_local! {
    static LOOPS: RefCell<[Option<RenderLoop>; 2]> = RefCell::new([None, None]);
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Match the backing store to the displayed size. Returns the size in pixels.
fn sync_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = (rect.width() as u32, rect.height() as u32);
    if w > 0 && h > 0 && (canvas.width() != w || canvas.height() != h) {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    (canvas.width() as f64, canvas.height() as f64)
}

fn request_frame(callback: &FrameCallback, pending: &Cell<Option<i32>>) {
    let Some(window) = web_sys::window() else { return };
    if let Some(cb) = callback.borrow().as_ref() {
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => pending.set(Some(id)),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

/// Start drawing `channel`'s analyser output into `canvas` once per display frame.
pub fn attach(channel: Channel, canvas: HtmlCanvasElement, fft: FftSize) {
    detach(channel);
    let Some(ctx) = context_2d(&canvas) else {
        log::error!("no 2d context for the {} display", channel.heading());
        return;
    };

    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let mut frame = SpectrumFrame::new(fft);

    let next = callback.clone();
    let next_pending = pending.clone();
    *callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
        next_pending.set(None);
        let (w, h) = sync_size(&canvas);
        if !media_graph::read_frequency_data(channel, &mut frame.bins) {
            frame.clear();
        }
        spectrum_renderer::draw_frame(&ctx, &frame, w, h);
        request_frame(&next, &next_pending);
    }));

    request_frame(&callback, &pending);
    LOOPS.with(|l| l.borrow_mut()[channel.index()] = Some(RenderLoop { pending, callback }));
    log::debug!("spectrum loop attached for {}", channel.heading());
}

pub fn detach(channel: Channel) {
    let old = LOOPS.with(|l| l.borrow_mut()[channel.index()].take());
    if old.is_some() {
        log::debug!("spectrum loop detached for {}", channel.heading());
    }
}

#[component]
pub fn SpectrumView(channel: Channel) -> impl IntoView {
    let state = expect_context::<AppState>();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let has_audio = Memo::new(move |_| state.workspace.with(|w| w.resource(channel).is_some()));
    let fft = state.config.with_value(|c| c.fft());

    Effect::new(move || {
        let active = has_audio.get();
        let Some(canvas) = canvas_ref.get() else { return };
        if active {
            attach(channel, canvas, fft);
        } else {
            detach(channel);
            let (w, h) = sync_size(&canvas);
            if let Some(ctx) = context_2d(&canvas) {
                spectrum_renderer::clear(&ctx, w, h);
            }
        }
    });

    on_cleanup(move || detach(channel));

    view! {
        <div class="spectrum">
            <canvas node_ref=canvas_ref />
            <Show when=move || !has_audio.get()>
                <div class="spectrum-placeholder">"No audio loaded"</div>
            </Show>
        </div>
    }
}
