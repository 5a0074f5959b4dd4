use std::path::Path;

use anyhow::Context as _;

use crate::{
    clock::scene::ClockScene,
    foundation::error::{LapseError, LapseResult},
};

/// Turns a [`ClockScene`] into a concrete artifact.
pub trait SceneEmitter {
    type Output;

    fn emit(&self, scene: &ClockScene) -> LapseResult<Self::Output>;
}

/// Emits an SVG document: black round-capped strokes on a transparent square.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgEmitter;

impl SceneEmitter for SvgEmitter {
    type Output = String;

    fn emit(&self, scene: &ClockScene) -> LapseResult<String> {
        let side = scene.size;
        let mut svg = String::with_capacity(256 + 128 * 14);
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="0 0 {side} {side}">"#
        ));
        svg.push('\n');
        svg.push_str(r#"<g fill="none" stroke="black" stroke-linecap="round">"#);
        svg.push('\n');
        for stroke in scene.strokes() {
            let l = stroke.line;
            svg.push_str(&format!(
                r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke-width="{:.3}"/>"#,
                l.p0.x, l.p0.y, l.p1.x, l.p1.y, stroke.width
            ));
            svg.push('\n');
        }
        svg.push_str("</g>\n</svg>\n");
        Ok(svg)
    }
}

/// Straight-alpha RGBA8 clock image, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl ClockImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn save_png(&self, path: &Path) -> LapseResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.rgba8,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Rasterizes the SVG emission with `usvg` + `resvg`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEmitter;

impl SceneEmitter for PngEmitter {
    type Output = ClockImage;

    fn emit(&self, scene: &ClockScene) -> LapseResult<ClockImage> {
        let svg = SvgEmitter.emit(scene)?;
        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
            .map_err(|e| LapseError::render(format!("parse clock svg: {e}")))?;

        let side = scene.size;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(side, side)
            .ok_or_else(|| LapseError::render("failed to allocate clock pixmap"))?;
        let sx = (side as f32) / tree.size().width();
        let sy = (side as f32) / tree.size().height();
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );

        let mut rgba8 = Vec::with_capacity((side as usize) * (side as usize) * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba8.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(ClockImage {
            width: side,
            height: side,
            rgba8,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/emit.rs"]
mod tests;
