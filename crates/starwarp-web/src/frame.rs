use crate::canvas::Canvas2d;
use crate::Engine;
use instant::Instant;
use starwarp_core::{Starfield, EFFECT_TICK_SEC};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Log renderer stats every this many frames
const STATS_EVERY_FRAMES: u64 = 600;

pub struct FrameContext {
    pub starfield: Rc<RefCell<Starfield>>,
    pub canvas: Canvas2d,
    pub last_instant: Instant,
    pub frames: u64,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        let stats = self.starfield.borrow_mut().frame(dt_sec, &mut self.canvas);
        self.frames += 1;
        if let Some(stats) = stats.filter(|_| self.frames % STATS_EVERY_FRAMES == 0) {
            log::debug!(
                "[frame] {} trails, {} points, {} culled",
                stats.trails,
                stats.points,
                stats.culled
            );
        }
    }
}

/// Drive `frame_ctx` from requestAnimationFrame for the life of the page.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Effect timers run on their own interval, independent of the frame rate.
pub fn start_effects_clock(engine: Rc<RefCell<Engine>>) {
    let Some(window) = web::window() else {
        return;
    };
    let mut last = Instant::now();
    let closure = Closure::wrap(Box::new(move || {
        let now = Instant::now();
        let dt = (now - last).as_secs_f64();
        last = now;
        if let Err(e) = engine.borrow_mut().advance(dt) {
            log::warn!("[effects] {e}");
        }
    }) as Box<dyn FnMut()>);
    let period_ms = (EFFECT_TICK_SEC * 1000.0).round() as i32;
    _ = window.set_interval_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), period_ms);
    closure.forget();
}
