#![cfg(target_arch = "wasm32")]
use instant::Instant;
use starwarp_core::{EffectsEngine, Playlist, Starfield, Transport};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod audio;
mod canvas;
mod dom;
mod events;
mod frame;
mod transport;

pub type Engine = EffectsEngine<audio::WebAudioGraph, transport::MediaTransport>;

const PLAYLIST_URL: &str = "/data/playlist.json";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("starwarp-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = dom::element_as(&document, "starfield")?;
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("getContext: {:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Stars fly behind the splash screen from the first frame
    let seed: u64 = rand::random();
    let viewport = dom::sync_canvas_backing_size(&canvas);
    let starfield = Rc::new(RefCell::new(Starfield::new(viewport, seed)));
    {
        let starfield = starfield.clone();
        dom::wire_canvas_resize(&canvas, move |viewport| starfield.borrow_mut().resize(viewport));
    }
    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext {
        starfield: starfield.clone(),
        canvas: canvas::Canvas2d::new(ctx),
        last_instant: Instant::now(),
        frames: 0,
    })));

    let player: web::HtmlAudioElement = dom::element_as(&document, "player")?;
    let mut transport = transport::MediaTransport::new(player.clone());
    let mut playlist = fetch_playlist(&window, PLAYLIST_URL).await?;
    {
        let doc = document.clone();
        playlist.subscribe(move |track| {
            dom::set_text(&doc, "track-title", &track.title);
            dom::set_text(&doc, "track-artist", &track.artist);
            Ok(())
        });
    }
    if !playlist.is_empty() {
        playlist.load(0, &mut transport)?;
    }

    let warp = starfield.borrow().warp_target();
    let engine = Rc::new(RefCell::new(Engine::new(warp, transport, playlist, seed)));

    events::wire_controls(&engine, &document);
    events::wire_keyboard(&engine);
    events::wire_track_end(&engine, &player);
    wire_splash(&engine, &document, &player);
    frame::start_effects_clock(engine);
    Ok(())
}

async fn fetch_playlist(window: &web::Window, url: &str) -> anyhow::Result<Playlist> {
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("fetch {url}: {:?}", e))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("fetch {url}: not a Response: {:?}", e))?;
    if !resp.ok() {
        anyhow::bail!("fetch {url}: HTTP {}", resp.status());
    }
    let body = resp.text().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| anyhow::anyhow!("read {url}: {:?}", e))?
        .as_string()
        .ok_or_else(|| anyhow::anyhow!("{url}: body is not text"))?;
    Ok(Playlist::from_json(&text)?)
}

// The AudioContext and media capture must be created inside a user gesture
fn wire_splash(engine: &Rc<RefCell<Engine>>, document: &web::Document, player: &web::HtmlAudioElement) {
    let started = Cell::new(false);
    let engine = engine.clone();
    let player = player.clone();
    let doc = document.clone();
    dom::add_click_listener(document, "splash", move || {
        if started.replace(true) {
            log::warn!("[gesture] start already triggered; ignoring extra click");
            return;
        }
        let mut engine = engine.borrow_mut();
        match audio::WebAudioGraph::new(&player) {
            Ok(graph) => engine.attach_audio(graph),
            Err(e) => log::error!("[gesture] audio unavailable, continuing without effects audio: {:?}", e),
        }
        if let Err(e) = engine.transport_mut().play() {
            log::warn!("[gesture] {e}");
        }
        dom::hide(&doc, "splash");
    });
}
