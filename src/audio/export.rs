use wasm_bindgen::JsCast;
use web_sys::HtmlAnchorElement;

use crate::audio::resource::PlayableResource;

/// Hand the resource to the browser's download manager under `filename`.
pub fn download(resource: &PlayableResource, filename: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let body = document.body().ok_or("no body")?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| "anchor cast failed".to_string())?;
    anchor.set_href(resource.url());
    anchor.set_download(filename);
    anchor
        .set_attribute("style", "display:none")
        .map_err(|e| format!("{e:?}"))?;

    body.append_child(&anchor).map_err(|e| format!("{e:?}"))?;
    anchor.click();
    anchor.remove();
    log::info!("download of resource {} started as {filename}", resource.id());
    Ok(())
}
