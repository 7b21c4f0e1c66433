use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MouseEvent, TouchEvent, Window};

/// Window-level move/release listeners for the lifetime of one drag.
///
/// Acquired when a drag starts; dropping it removes every listener it added,
/// so a drag that ends early (or a component that unmounts mid-drag) leaves
/// nothing behind.
pub struct DragCapture {
    window: Window,
    registered: Vec<(&'static str, js_sys::Function)>,
    _mouse: Vec<Closure<dyn FnMut(MouseEvent)>>,
    _touch: Vec<Closure<dyn FnMut(TouchEvent)>>,
}

impl DragCapture {
    /// `on_move` receives the pointer's client x; `on_end` fires on release anywhere.
    pub fn acquire(on_move: impl Fn(f64) + Clone + 'static, on_end: impl Fn() + Clone + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let mut capture = Self {
            window,
            registered: Vec::new(),
            _mouse: Vec::new(),
            _touch: Vec::new(),
        };

        let mv = on_move.clone();
        capture.listen_mouse("mousemove", move |ev| mv(ev.client_x() as f64));
        let mv = on_move;
        capture.listen_touch("touchmove", move |ev| {
            if let Some(t) = ev.touches().get(0) {
                mv(t.client_x() as f64);
            }
        });

        let end = on_end.clone();
        capture.listen_mouse("mouseup", move |_| end());
        let end = on_end.clone();
        capture.listen_touch("touchend", move |_| end());
        let end = on_end;
        capture.listen_touch("touchcancel", move |_| end());

        log::debug!("drag capture acquired ({} listeners)", capture.registered.len());
        Some(capture)
    }

    fn listen_mouse(&mut self, event: &'static str, f: impl FnMut(MouseEvent) + 'static) {
        let closure = Closure::<dyn FnMut(MouseEvent)>::new(f);
        let func = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        self.register(event, func);
        self._mouse.push(closure);
    }

    fn listen_touch(&mut self, event: &'static str, f: impl FnMut(TouchEvent) + 'static) {
        let closure = Closure::<dyn FnMut(TouchEvent)>::new(f);
        let func = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        self.register(event, func);
        self._touch.push(closure);
    }

    fn register(&mut self, event: &'static str, func: js_sys::Function) {
        match self.window.add_event_listener_with_callback(event, &func) {
            Ok(()) => self.registered.push((event, func)),
            Err(e) => log::warn!("could not listen for {event}: {:?}", e),
        }
    }
}

impl Drop for DragCapture {
    fn drop(&mut self) {
        for (event, func) in self.registered.drain(..) {
            let _ = self.window.remove_event_listener_with_callback(event, &func);
        }
        log::debug!("drag capture released");
    }
}
