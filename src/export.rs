use std::path::Path;

use kurbo::Point;

use crate::{
    error::{FlagError, FlagResult},
    layout::Layout,
    model::{DesignMetrics, Edge, StockStyle},
    paint::Surface,
};

/// Largest supported canvas edge, in device pixels. The shared drawing
/// surface is allocated at this size once per invocation.
pub const MAX_CANVAS_DIM: u32 = 2048;

/// Crop window handed to the PNG encoder, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Local position of the body's (0,0) on the canvas. Every side keeps one
/// unit of padding plus half the border stroke; the side with the active
/// tab additionally clears the tab overhang.
pub fn placement_origin(layout: &Layout, style: StockStyle, design: &DesignMetrics) -> Point {
    let pad = 1.0 + design.border_width / 2.0;
    let tab = style.tab_edge();
    let x = pad
        + if tab == Some(Edge::Left) {
            layout.stock_height + 1.0
        } else {
            0.0
        };
    let y = pad
        + if tab == Some(Edge::Top) {
            layout.stock_height + 1.0
        } else {
            0.0
        };
    Point::new(x, y)
}

/// Tight output rectangle for one style: body plus border and padding,
/// extended by `stock_height + 1` on the side the tab protrudes, scaled and
/// rounded up to whole device pixels.
pub fn export_rect(
    layout: &Layout,
    style: StockStyle,
    design: &DesignMetrics,
    scale: f64,
) -> FlagResult<ExportRect> {
    // Worst-case bound: the badge must fit the canvas whichever single
    // edge carries the tab, so check as if both opposing sides overhang.
    let bound_w = (layout.body_width + 2.0 * (design.border_width + layout.stock_height)) * scale;
    let bound_h = (layout.body_height + 2.0 * (design.border_width + layout.stock_height)) * scale;
    if bound_w > f64::from(MAX_CANVAS_DIM) || bound_h > f64::from(MAX_CANVAS_DIM) {
        return Err(FlagError::clipping(format!(
            "badge at scale {scale} needs up to {bound_w:.0}x{bound_h:.0} device pixels (max {MAX_CANVAS_DIM})"
        )));
    }

    let mut w = layout.body_width + design.border_width + 2.0;
    let mut h = layout.body_height + design.border_width + 2.0;
    match style.tab_edge() {
        Some(Edge::Left) | Some(Edge::Right) => w += layout.stock_height + 1.0,
        Some(Edge::Top) | Some(Edge::Bottom) => h += layout.stock_height + 1.0,
        None => {}
    }

    Ok(ExportRect {
        x: 0,
        y: 0,
        width: (w * scale).ceil() as u32,
        height: (h * scale).ceil() as u32,
    })
}

/// Output file name: `{prefix}_{tag}_{scale:.1}.png`.
pub fn style_file_name(prefix: &str, style: StockStyle, scale: f64) -> String {
    format!("{prefix}_{}_{scale:.1}.png", style.tag())
}

/// Crops the rendered surface to `rect` and writes it as an alpha PNG. The
/// surface bytes are premultiplied RGBA8 straight from the rasterizer.
pub fn write_png(surface: &Surface, rect: ExportRect, path: &Path) -> FlagResult<()> {
    let (sw, sh) = (surface.width(), surface.height());
    if rect.x + rect.width > sw || rect.y + rect.height > sh {
        return Err(FlagError::clipping(format!(
            "export rect {}x{}+{}+{} exceeds canvas {sw}x{sh}",
            rect.width, rect.height, rect.x, rect.y
        )));
    }

    let data = surface.data();
    let stride = sw as usize * 4;
    let row_bytes = rect.width as usize * 4;
    let mut cropped = Vec::with_capacity(rect.height as usize * row_bytes);
    for row in rect.y..rect.y + rect.height {
        let start = row as usize * stride + rect.x as usize * 4;
        cropped.extend_from_slice(&data[start..start + row_bytes]);
    }

    image::save_buffer_with_format(
        path,
        &cropped,
        rect.width,
        rect.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| FlagError::encode(format!("write '{}': {e}", path.display())))
}
