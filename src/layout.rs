use kurbo::Point;
use serde::Serialize;

use crate::{
    error::FlagResult,
    metrics::{ShapedText, TextMetricsProvider},
    model::DesignMetrics,
};

/// Logo dimensions in local units, derived from the decoded bitmap's aspect
/// ratio at the target height.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LogoMetrics {
    pub width: f64,
    pub height: f64,
}

/// Where the logo lands inside the body. `anchor` is the top-left corner.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LogoSlot {
    pub width: f64,
    pub height: f64,
    pub anchor: Point,
}

/// Resolved badge geometry in local (pre-scale) units. Computed fresh for
/// every style; the output scale is applied later as a render transform.
#[derive(Clone, Debug, Serialize)]
pub struct Layout {
    pub body_width: f64,
    pub body_height: f64,
    pub text_width: f64,
    pub text_anchor: Point, // baseline left of the label
    pub stock_height: f64,
    pub stock_width: f64,
    pub logo: Option<LogoSlot>,
    #[serde(skip)]
    pub shaped: ShapedText,
}

/// Body height alone. Lets the batch runner size the logo decode before the
/// per-style loop; `compute_layout` reproduces the same value.
pub fn body_height(
    text: &str,
    design: &DesignMetrics,
    provider: &mut dyn TextMetricsProvider,
) -> FlagResult<f64> {
    let shaped = provider.shape(text)?;
    let correction = provider.glyph_ink_height(design.reference_glyph)?;
    Ok(2.0 * shaped.metrics.line_height() - correction)
}

/// Computes the badge geometry for one label. Pure given the provider's
/// measurements: the same inputs always yield the same layout.
pub fn compute_layout(
    text: &str,
    design: &DesignMetrics,
    provider: &mut dyn TextMetricsProvider,
    logo: Option<LogoMetrics>,
) -> FlagResult<Layout> {
    let shaped = provider.shape(text)?;
    let line_height = shaped.metrics.line_height();
    let correction = provider.glyph_ink_height(design.reference_glyph)?;

    // Two line heights minus the reference glyph's ink height: one line for
    // the label plus symmetric breathing room above and below it.
    let body_height = 2.0 * line_height - correction;

    let logo_advance = logo
        .map(|l| l.width + design.logo_margin / 2.0)
        .unwrap_or(0.0);
    let text_width = shaped.metrics.advance;
    let body_width = text_width + 2.0 * (design.margin_lr + design.border_width) + logo_advance;

    let text_anchor = Point::new(
        design.margin_lr + design.border_width + logo_advance,
        line_height,
    );
    let logo = logo.map(|l| LogoSlot {
        width: l.width,
        height: l.height,
        anchor: Point::new(
            design.margin_lr + design.border_width,
            (body_height - l.height) / 2.0,
        ),
    });

    Ok(Layout {
        body_width,
        body_height,
        text_width,
        text_anchor,
        stock_height: body_height / 2.0,
        stock_width: body_height / 4.0,
        logo,
        shaped,
    })
}
