use glam::Vec2;
use starwarp_core::{StarCanvas, Transform};
use std::f64::consts::TAU;
use wasm_bindgen::JsValue;
use web_sys as web;

/// `StarCanvas` over a 2D rendering context: black sky, white stars.
pub struct Canvas2d {
    ctx: web::CanvasRenderingContext2d,
    sky: JsValue,
    star: JsValue,
}

impl Canvas2d {
    pub fn new(ctx: web::CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        Self {
            ctx,
            sky: JsValue::from_str("#000"),
            star: JsValue::from_str("#fff"),
        }
    }
}

impl StarCanvas for Canvas2d {
    fn set_transform(&mut self, t: &Transform) {
        _ = self.ctx.set_transform(
            t.a as f64, t.b as f64, t.c as f64, t.d as f64, t.e as f64, t.f as f64,
        );
    }

    #[allow(deprecated)]
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style(&self.sky);
        self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        self.ctx.set_fill_style(&self.star);
        self.ctx.set_stroke_style(&self.star);
    }

    fn dot(&mut self, at: Vec2, radius: f32, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.begin_path();
        _ = self.ctx.arc(at.x as f64, at.y as f64, radius as f64, 0.0, TAU);
        self.ctx.fill();
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}
