use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::error::{FlagError, FlagResult};

/// Decoded logo pixels at device resolution, row-major premultiplied RGBA8.
/// Decoded once per invocation and shared across all styles.
#[derive(Clone, Debug)]
pub struct LogoBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl LogoBitmap {
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Decodes the logo at `target_height` device pixels, preserving the native
/// aspect ratio. SVG sources rasterize directly at the target size; raster
/// sources are premultiplied and resampled.
pub fn decode_logo(path: &Path, target_height: u32) -> FlagResult<LogoBitmap> {
    if target_height == 0 {
        return Err(FlagError::logo_decode("logo target height is zero"));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| FlagError::logo_decode(format!("read '{}': {e}", path.display())))?;

    let is_svg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    let bitmap = if is_svg {
        decode_svg(&bytes, target_height)?
    } else {
        decode_raster(&bytes, target_height)?
    };

    debug!(
        width = bitmap.width,
        height = bitmap.height,
        "decoded logo"
    );
    Ok(bitmap)
}

fn decode_svg(bytes: &[u8], target_height: u32) -> FlagResult<LogoBitmap> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FlagError::logo_decode(format!("parse svg tree: {e}")))?;

    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(FlagError::logo_decode("svg has invalid width/height"));
    }

    let scale = target_height as f32 / size.height();
    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = target_height;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FlagError::logo_decode("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(LogoBitmap {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

fn decode_raster(bytes: &[u8], target_height: u32) -> FlagResult<LogoBitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FlagError::logo_decode(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(FlagError::logo_decode("image has zero dimensions"));
    }

    // Premultiply before resampling so transparent texels do not bleed
    // color into their neighbors.
    let mut raw = rgba.into_raw();
    premultiply_rgba8_in_place(&mut raw);
    let premul = image::RgbaImage::from_raw(w, h, raw)
        .ok_or_else(|| FlagError::logo_decode("premultiplied buffer size mismatch"))?;

    let height = target_height;
    let width = (((w as f64) * (height as f64) / (h as f64)).round() as u32).max(1);
    let resized = image::imageops::resize(
        &premul,
        width,
        height,
        image::imageops::FilterType::CatmullRom,
    );

    Ok(LogoBitmap {
        width,
        height,
        rgba8_premul: Arc::new(resized.into_raw()),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
