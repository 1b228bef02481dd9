use crate::dom;
use crate::Engine;
use starwarp_core::{Direction, EngineError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

fn report(action: &str, result: Result<(), EngineError>) {
    if let Err(e) = result {
        log::warn!("[controls] {action} failed: {e}");
    }
}

/// Transport buttons, hold-to-scrub pads, volume slider and mute.
pub fn wire_controls(engine: &Rc<RefCell<Engine>>, document: &web::Document) {
    let e = engine.clone();
    dom::add_click_listener(document, "skip-forward", move || {
        report("skip forward", e.borrow_mut().skip_forward());
    });
    let e = engine.clone();
    dom::add_click_listener(document, "skip-back", move || {
        report("skip back", e.borrow_mut().skip_backward());
    });
    let e = engine.clone();
    dom::add_click_listener(document, "shuffle", move || {
        report("shuffle", e.borrow_mut().shuffle().map(|_| ()));
    });

    wire_hold(engine, document, "scrub-forward", Direction::Forward);
    wire_hold(engine, document, "scrub-back", Direction::Backward);

    let e = engine.clone();
    let doc = document.clone();
    dom::add_click_listener(document, "mute", move || {
        let muted = e.borrow_mut().toggle_mute();
        if let Some(el) = doc.get_element_by_id("mute") {
            _ = el.class_list().toggle_with_force("muted", muted);
        }
    });

    let e = engine.clone();
    dom::add_event_listener(document, "volume", "input", move |ev| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web::HtmlInputElement>().ok())
        else {
            return;
        };
        let level = input.value_as_number() as f32;
        e.borrow_mut().set_volume(level);
    });
}

// Press starts the scrub; release, leaving the pad or a cancelled pointer ends it
fn wire_hold(engine: &Rc<RefCell<Engine>>, document: &web::Document, element_id: &str, direction: Direction) {
    let e = engine.clone();
    dom::add_event_listener(document, element_id, "pointerdown", move |ev| {
        ev.prevent_default();
        e.borrow_mut().begin_scrub(direction);
    });
    for release in ["pointerup", "pointerleave", "pointercancel"] {
        let e = engine.clone();
        dom::add_event_listener(document, element_id, release, move |_| {
            e.borrow_mut().end_scrub();
        });
    }
}

pub fn wire_keyboard(engine: &Rc<RefCell<Engine>>) {
    let Some(window) = web::window() else {
        return;
    };
    let e = engine.clone();
    dom::listen(&window, "keydown", move |ev| {
        let Ok(key_ev) = ev.dyn_into::<web::KeyboardEvent>() else {
            return;
        };
        if key_ev.repeat() {
            return;
        }
        let mut engine = e.borrow_mut();
        match key_ev.key().as_str() {
            "ArrowRight" => report("skip forward", engine.skip_forward()),
            "ArrowLeft" => report("skip back", engine.skip_backward()),
            "s" | "S" => report("shuffle", engine.shuffle().map(|_| ())),
            "m" | "M" => {
                let muted = engine.toggle_mute();
                log::info!("[controls] muted: {muted}");
            }
            _ => {}
        }
    });
}

/// Auto-advance when the element finishes a track.
pub fn wire_track_end(engine: &Rc<RefCell<Engine>>, player: &web::HtmlAudioElement) {
    let e = engine.clone();
    dom::listen(player, "ended", move |_| {
        report("advance", e.borrow_mut().on_track_ended());
    });
}
