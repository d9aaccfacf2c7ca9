use std::sync::Arc;

use kurbo::Affine;

use crate::{
    color::ColorSet,
    error::{FlagError, FlagResult},
    layout::Layout,
    logo::LogoBitmap,
    metrics::LoadedFont,
    model::DesignMetrics,
    outline::Outline,
};

/// Reusable drawing target: one fixed-size pixmap plus the render context
/// that draws into it. The batch loop clears and redraws it per style.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> FlagResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| FlagError::configuration("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| FlagError::configuration("canvas height exceeds u16"))?;
        Ok(Self {
            width: w,
            height: h,
            pixmap: vello_cpu::Pixmap::new(w, h),
            ctx: vello_cpu::RenderContext::new(w, h),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Premultiplied RGBA8 bytes of the last rendered frame, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

/// Where the badge body lands on the canvas: `origin` is the body's local
/// (0,0) in local units, `scale` maps local units to device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub origin: kurbo::Point,
    pub scale: f64,
}

/// Logo pixels wrapped as an image paint. Built once per batch; clones
/// share the underlying pixmap.
#[derive(Clone)]
pub struct LogoPaint {
    image: vello_cpu::Image,
    width: f64,
    height: f64,
}

impl LogoPaint {
    pub fn new(bitmap: &LogoBitmap) -> FlagResult<Self> {
        let pixmap =
            premul_bytes_to_pixmap(bitmap.rgba8_premul.as_slice(), bitmap.width, bitmap.height)?;
        Ok(Self {
            image: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: f64::from(bitmap.width),
            height: f64::from(bitmap.height),
        })
    }
}

/// Glyph source for the painter, cheap to clone across styles.
pub fn font_data_for(font: &LoadedFont) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
        font.index,
    )
}

/// Draws one badge: clear, body fill, border stroke, logo, label glyphs.
/// The surface pixmap holds the rendered frame afterwards.
pub fn paint_flag(
    surface: &mut Surface,
    layout: &Layout,
    outline: &Outline,
    colors: &ColorSet,
    design: &DesignMetrics,
    font: &vello_cpu::peniko::FontData,
    logo: Option<&LogoPaint>,
    placement: Placement,
) -> FlagResult<()> {
    let ctx = &mut surface.ctx;
    ctx.reset();
    clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let base = Affine::scale(placement.scale) * Affine::translate(placement.origin.to_vec2());

    // Fill and stroke share one path, cairo fill-preserve style. The stroke
    // width is in local units and rides the same transform as the geometry.
    let path = bezpath_to_cpu(&outline.to_bez_path());
    ctx.set_transform(affine_to_cpu(base));
    let [r, g, b, a] = colors.flag.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&path);

    let [r, g, b, a] = colors.border.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(design.border_width));
    ctx.stroke_path(&path);

    // The logo bitmap is pre-rasterized at device resolution; the slot
    // transform scales it back to local units so the net device scale is 1
    // and the blit stays crisp.
    if let (Some(paint), Some(slot)) = (logo, layout.logo) {
        let to_slot = base
            * Affine::translate(slot.anchor.to_vec2())
            * Affine::scale_non_uniform(slot.width / paint.width, slot.height / paint.height);
        ctx.set_transform(affine_to_cpu(to_slot));
        ctx.set_paint(paint.image.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, paint.width, paint.height));
    }

    let [r, g, b, a] = colors.text.to_rgba8();
    ctx.set_transform(affine_to_cpu(
        base * Affine::translate(layout.text_anchor.to_vec2()),
    ));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    let glyphs = layout.shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    });
    ctx.glyph_run(font)
        .font_size(design.font_size as f32)
        .fill_glyphs(glyphs);

    ctx.flush();
    ctx.render_to_pixmap(&mut surface.pixmap);
    Ok(())
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
        vello_cpu::kurbo::Point::new(p.x, p.y)
    }

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FlagResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FlagError::logo_decode("logo width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FlagError::logo_decode("logo height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FlagError::logo_decode("logo byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
