//! Canvas2D backend for the draw list
//!
//! The view is letterboxed: the fixed `VIEW_WIDTH` x `PLAYFIELD_HEIGHT` space is
//! scaled uniformly to fit the canvas and centred.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::{Color, DrawCmd, Stroke};
use crate::consts::{PLAYFIELD_HEIGHT, VIEW_WIDTH};

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    size: (u32, u32),
}

fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            size: (canvas.width(), canvas.height()),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn paint(&self, cmds: &[DrawCmd]) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);

        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.set_fill_style_str("#000");
        ctx.fill_rect(0.0, 0.0, w, h);

        let scale = (w / VIEW_WIDTH as f64).min(h / PLAYFIELD_HEIGHT as f64);
        let ox = (w - VIEW_WIDTH as f64 * scale) / 2.0;
        let oy = (h - PLAYFIELD_HEIGHT as f64 * scale) / 2.0;
        ctx.set_transform(scale, 0.0, 0.0, scale, ox, oy)?;

        for cmd in cmds {
            self.paint_one(cmd)?;
        }
        Ok(())
    }

    fn paint_one(&self, cmd: &DrawCmd) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Rect { rect, color } => {
                ctx.set_fill_style_str(&css(*color));
                ctx.fill_rect(
                    rect.left as f64,
                    rect.top as f64,
                    rect.width() as f64,
                    rect.height() as f64,
                );
            }
            DrawCmd::Polygon {
                points,
                fill,
                outline,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    return Ok(());
                };
                ctx.begin_path();
                ctx.move_to(first.x as f64, first.y as f64);
                for p in rest {
                    ctx.line_to(p.x as f64, p.y as f64);
                }
                ctx.close_path();
                self.finish_path(*fill, *outline);
            }
            DrawCmd::Circle {
                center,
                radius,
                fill,
                outline,
            } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)?;
                self.finish_path(*fill, *outline);
            }
            DrawCmd::Line { from, to, stroke } => {
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                self.apply_stroke(*stroke);
                ctx.stroke();
            }
            DrawCmd::Text { pos, text, color } => {
                ctx.set_fill_style_str(&css(*color));
                ctx.set_font("bold 10px sans-serif");
                ctx.set_text_align("center");
                ctx.fill_text(text, pos.x as f64, pos.y as f64 + 4.0)?;
            }
        }
        Ok(())
    }

    fn finish_path(&self, fill: Option<Color>, outline: Option<Stroke>) {
        if let Some(color) = fill {
            self.ctx.set_fill_style_str(&css(color));
            self.ctx.fill();
        }
        if let Some(stroke) = outline {
            self.apply_stroke(stroke);
            self.ctx.stroke();
        }
    }

    fn apply_stroke(&self, stroke: Stroke) {
        self.ctx.set_stroke_style_str(&css(stroke.color));
        self.ctx.set_line_width(stroke.width as f64);
    }
}
