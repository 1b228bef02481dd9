use starwarp_core::Viewport;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn element_as<T: JsCast>(document: &web::Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!("#{id} has the wrong type: {:?}", e))
}

#[inline]
pub fn add_click_listener(document: &web::Document, element_id: &str, mut handler: impl FnMut() + 'static) {
    add_event_listener(document, element_id, "click", move |_| handler());
}

/// Attach `handler` to `event` on `#element_id`, if the element exists.
pub fn add_event_listener(
    document: &web::Document,
    element_id: &str,
    event: &str,
    handler: impl FnMut(web::Event) + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        listen(&el, event, handler);
    } else {
        log::debug!("[dom] no #{element_id}; skipping {event} listener");
    }
}

pub fn listen(target: &web::EventTarget, event: &str, handler: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
    _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

#[inline]
pub fn hide(document: &web::Document, element_id: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        _ = el.class_list().add_1("hidden");
    }
}

/// Viewport of the canvas in CSS pixels at the current device pixel ratio.
pub fn canvas_viewport(canvas: &web::HtmlCanvasElement) -> Viewport {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    Viewport::new(rect.width() as f32, rect.height() as f32, dpr as f32)
}

/// Match the backing store to CSS size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Viewport {
    let viewport = canvas_viewport(canvas);
    let (w_px, h_px) = viewport.backing_size();
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    viewport
}

/// Call `on_resize` after window resizes and pinch zoom.
pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement, on_resize: impl FnMut(Viewport) + 'static) {
    let Some(window) = web::window() else {
        return;
    };
    let canvas = canvas.clone();
    let on_resize = RefCell::new(on_resize);
    let resize = Rc::new(move |_: web::Event| {
        let viewport = sync_canvas_backing_size(&canvas);
        let mut on_resize = on_resize.borrow_mut();
        (*on_resize)(viewport);
    });

    let r = resize.clone();
    listen(&window, "resize", move |ev| (*r)(ev));
    if let Some(visual) = window.visual_viewport() {
        listen(&visual, "resize", move |ev| (*resize)(ev));
    }
}
