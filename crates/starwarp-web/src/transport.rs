use starwarp_core::{clamp_position, EngineError, Transport};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Playback through the page's `<audio>` element.
pub struct MediaTransport {
    el: web::HtmlAudioElement,
    /// Set when a play promise rejects; drained by `take_rejection`.
    rejected: Rc<RefCell<Option<EngineError>>>,
}

impl MediaTransport {
    pub fn new(el: web::HtmlAudioElement) -> Self {
        Self {
            el,
            rejected: Rc::new(RefCell::new(None)),
        }
    }
}

impl Transport for MediaTransport {
    fn position(&self) -> f64 {
        self.el.current_time()
    }

    fn set_position(&mut self, seconds: f64) {
        self.el.set_current_time(clamp_position(seconds, self.duration()));
    }

    // NaN until metadata loads, +inf for streams
    fn duration(&self) -> Option<f64> {
        let d = self.el.duration();
        (d.is_finite() && d > 0.0).then_some(d)
    }

    fn load(&mut self, source: &str) {
        self.el.set_src(source);
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let promise = self
            .el
            .play()
            .map_err(|e| EngineError::PlaybackRejected(format!("{:?}", e)))?;
        // Autoplay rejection arrives asynchronously
        let rejected = self.rejected.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[transport] play() rejected: {:?}", e);
                *rejected.borrow_mut() = Some(EngineError::PlaybackRejected(format!("{:?}", e)));
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        _ = self.el.pause();
    }

    fn take_rejection(&mut self) -> Option<EngineError> {
        self.rejected.borrow_mut().take()
    }
}
