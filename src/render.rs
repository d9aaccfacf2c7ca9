use std::path::{Path, PathBuf};

use crate::{
    error::{FlagError, FlagResult},
    export,
    layout::{self, LogoMetrics},
    logo::{self, LogoBitmap},
    metrics::{self, MetricsBackend, TextMetricsProvider},
    model::{DesignMetrics, FlagSpec, StockStyle},
    outline,
    paint::{self, LogoPaint, Placement, Surface},
};

/// Batch knobs that are not part of the badge definition itself.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    pub backend: MetricsBackend,
    /// Font file override; otherwise the design family is resolved through
    /// the system font database.
    pub font_file: Option<PathBuf>,
}

/// Outcome of one 13-style batch. Styles that failed are recorded with a
/// human-readable reason instead of aborting the remaining styles.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(StockStyle, String)>,
}

/// Render the full style set described by `spec`, one PNG per style.
///
/// Pipeline per style:
/// 1. [`compute_layout`](crate::compute_layout)
/// 2. [`build_outline`](crate::build_outline)
/// 3. [`paint_flag`](crate::paint_flag)
/// 4. [`write_png`](crate::write_png)
///
/// Font resolution failures abort the whole batch (every style would fail
/// identically); everything after that is isolated per style. A missing,
/// undecodable, or unpaintable logo degrades to a text-only badge with a
/// warning.
pub fn render_flag_set(spec: &FlagSpec, opts: &RenderOptions) -> FlagResult<BatchReport> {
    spec.validate()?;
    let design = DesignMetrics::default();

    let font = metrics::load_font(&design.font_family, opts.font_file.as_deref())?;
    let mut provider = metrics::create_provider(opts.backend, &font, design.font_size)?;

    // The logo size depends on the body height, not on the style, so it is
    // decoded once and shared immutably across the iterations. A bitmap the
    // rasterizer cannot take as a paint degrades like a decode failure;
    // metrics drop with it so no style reserves an empty slot.
    let logo = prepare_logo(spec, &design, provider.as_mut());
    let (logo_paint, logo_metrics) = match &logo {
        Some((bitmap, metrics)) => match LogoPaint::new(bitmap) {
            Ok(paint) => (Some(paint), Some(*metrics)),
            Err(e) => {
                tracing::warn!(error = %e, "logo unusable as paint, rendering text-only badges");
                (None, None)
            }
        },
        None => (None, None),
    };

    let font_data = paint::font_data_for(&font);
    let mut surface = Surface::new(export::MAX_CANVAS_DIM, export::MAX_CANVAS_DIM)?;
    ensure_prefix_dir(&spec.file_prefix)?;

    let mut report = BatchReport::default();
    for style in StockStyle::ALL {
        match render_style(
            spec,
            style,
            &design,
            provider.as_mut(),
            &font_data,
            logo_metrics,
            logo_paint.as_ref(),
            &mut surface,
        ) {
            Ok(path) => report.written.push(path),
            Err(e) => {
                tracing::warn!(style = %style, error = %e, "skipping style");
                report.skipped.push((style, e.to_string()));
            }
        }
    }
    Ok(report)
}

#[tracing::instrument(skip_all, fields(style = %style))]
fn render_style(
    spec: &FlagSpec,
    style: StockStyle,
    design: &DesignMetrics,
    provider: &mut dyn TextMetricsProvider,
    font: &vello_cpu::peniko::FontData,
    logo_metrics: Option<LogoMetrics>,
    logo_paint: Option<&LogoPaint>,
    surface: &mut Surface,
) -> FlagResult<PathBuf> {
    let layout = layout::compute_layout(&spec.text, design, provider, logo_metrics)?;
    let outline = outline::build_outline(&layout, style, design)?;
    let rect = export::export_rect(&layout, style, design, spec.scale)?;

    let placement = Placement {
        origin: export::placement_origin(&layout, style, design),
        scale: spec.scale,
    };
    paint::paint_flag(
        surface,
        &layout,
        &outline,
        &spec.colors,
        design,
        font,
        logo_paint,
        placement,
    )?;

    let path = PathBuf::from(export::style_file_name(&spec.file_prefix, style, spec.scale));
    export::write_png(surface, rect, &path)?;
    Ok(path)
}

/// Decodes and sizes the logo the way the batch does: `None` when the spec
/// has no logo or when decoding fails (a warning is logged, the badge
/// degrades to text-only).
pub fn prepare_logo(
    spec: &FlagSpec,
    design: &DesignMetrics,
    provider: &mut dyn TextMetricsProvider,
) -> Option<(LogoBitmap, LogoMetrics)> {
    let path = spec.logo_path.as_deref()?;
    match sized_logo(path, spec, design, provider) {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!(
                logo = %path.display(),
                error = %e,
                "logo unavailable, rendering text-only badges"
            );
            None
        }
    }
}

/// Decodes the logo at device resolution for the slot it will occupy: the
/// slot is `body_height - logo_margin` tall in local units, the bitmap that
/// fills it is sized in device pixels so it stays crisp at any scale.
fn sized_logo(
    path: &Path,
    spec: &FlagSpec,
    design: &DesignMetrics,
    provider: &mut dyn TextMetricsProvider,
) -> FlagResult<(LogoBitmap, LogoMetrics)> {
    let body_height = layout::body_height(&spec.text, design, provider)?;
    let slot_height = body_height - design.logo_margin;
    if slot_height <= 0.0 {
        return Err(FlagError::geometry(format!(
            "body height {body_height:.2} leaves no room for a logo"
        )));
    }

    let device_height = ((slot_height * spec.scale).round() as u32).max(1);
    let bitmap = logo::decode_logo(path, device_height)?;
    let metrics = LogoMetrics {
        width: slot_height * bitmap.aspect(),
        height: slot_height,
    };
    Ok((bitmap, metrics))
}

fn ensure_prefix_dir(prefix: &str) -> FlagResult<()> {
    if let Some(parent) = Path::new(prefix).parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
