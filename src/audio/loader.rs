use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, Response};

/// Whole contents of a file or blob.
pub async fn read_blob(blob: &Blob) -> Result<Vec<u8>, String> {
    let buf = JsFuture::from(blob.array_buffer())
        .await
        .map_err(|e| format!("array_buffer: {e:?}"))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub async fn fetch_response(url: &str, init: Option<&web_sys::RequestInit>) -> Result<Response, String> {
    let window = web_sys::window().ok_or("no window")?;
    let promise = match init {
        Some(init) => window.fetch_with_str_and_init(url, init),
        None => window.fetch_with_str(url),
    };
    let value = JsFuture::from(promise)
        .await
        .map_err(|e| format!("fetch error: {e:?}"))?;
    value
        .dyn_into::<Response>()
        .map_err(|_| "Response cast failed".to_string())
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let resp = fetch_response(url, None).await?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("array_buffer: {e:?}"))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub async fn response_text(resp: &Response) -> Result<String, String> {
    let text = JsFuture::from(resp.text().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("text: {e:?}"))?;
    text.as_string().ok_or_else(|| "Not a string".to_string())
}

/// Resolve after `ms` milliseconds.
pub async fn sleep_ms(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let Some(win) = web_sys::window() else {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
            return;
        };
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms.min(i32::MAX as u32) as i32);
    });
    let _ = JsFuture::from(promise).await;
}

/// Yield once to the browser event loop so the UI can repaint between heavy steps.
pub async fn yield_now() {
    sleep_ms(0).await;
}
