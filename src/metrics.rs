use std::{borrow::Cow, path::Path, sync::Arc};

use tracing::debug;

use crate::error::{FlagError, FlagResult};

/// Line measurements for shaped label text, in local units at the design
/// font size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TextMetrics {
    pub advance: f64, // pen advance over the whole label
    pub ascent: f64,
    pub descent: f64, // positive magnitude below the baseline
    pub line_gap: f64,
}

impl TextMetrics {
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.line_gap
    }
}

/// One positioned glyph. `x` advances from 0 at the pen start, `y` is
/// relative to the baseline (positive down), so the painter can anchor the
/// run at any baseline point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug)]
pub struct ShapedText {
    pub glyphs: Vec<ShapedGlyph>,
    pub metrics: TextMetrics,
}

/// Measures and shapes label text. The layout math treats implementations
/// interchangeably; both ship-in providers measure the same loaded face.
pub trait TextMetricsProvider {
    fn shape(&mut self, text: &str) -> FlagResult<ShapedText>;

    /// Ink height of one glyph, used as the body height calibration offset.
    fn glyph_ink_height(&mut self, glyph: char) -> FlagResult<f64>;
}

/// Raw face bytes plus the face index inside them. Both metrics providers
/// and the glyph painter are constructed from the same loaded face so they
/// agree on glyph ids.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    pub family: String,
}

/// Resolves the badge font: an explicit font file when given, otherwise a
/// bold face from the system font database.
pub fn load_font(family: &str, font_file: Option<&Path>) -> FlagResult<LoadedFont> {
    if let Some(path) = font_file {
        let bytes = std::fs::read(path).map_err(|e| {
            FlagError::metrics(format!("read font file '{}': {e}", path.display()))
        })?;
        let family = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(family)
            .to_string();
        debug!(file = %path.display(), "using font file override");
        return Ok(LoadedFont {
            bytes: Arc::new(bytes),
            index: 0,
            family,
        });
    }

    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    // The requested family first, then the generic fallback, then faces
    // commonly present on Linux, macOS and Windows installs.
    let families = [
        usvg::fontdb::Family::Name(family),
        usvg::fontdb::Family::SansSerif,
        usvg::fontdb::Family::Name("DejaVu Sans"),
        usvg::fontdb::Family::Name("Liberation Sans"),
        usvg::fontdb::Family::Name("Noto Sans"),
        usvg::fontdb::Family::Name("Arial"),
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight::BOLD,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| FlagError::metrics("no usable font face in the system database"))?;

    let resolved = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| family.to_string());
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| FlagError::metrics("font face data unavailable"))?;

    debug!(family = %resolved, index, "resolved badge font");
    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        family: resolved,
    })
}

/// Which text measurement implementation drives layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricsBackend {
    #[default]
    Parley,
    Fontdue,
}

pub fn create_provider(
    backend: MetricsBackend,
    font: &LoadedFont,
    size: f64,
) -> FlagResult<Box<dyn TextMetricsProvider>> {
    match backend {
        MetricsBackend::Parley => Ok(Box::new(ParleyMetrics::new(font, size)?)),
        MetricsBackend::Fontdue => Ok(Box::new(FontdueMetrics::new(font, size)?)),
    }
}

/// Shaping-based provider backed by Parley.
pub struct ParleyMetrics {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family: String,
    size: f32,
}

impl ParleyMetrics {
    /// Reference glyph ink height as a fraction of the font size. Parley
    /// exposes no per-glyph ink extents, so the calibration offset is a
    /// constant fraction; the fontdue provider measures the true raster
    /// height instead.
    const INK_HEIGHT_RATIO: f64 = 0.8;

    pub fn new(font: &LoadedFont, size: f64) -> FlagResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FlagError::metrics("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlagError::metrics("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            size: size as f32,
        })
    }

    fn layout(&mut self, text: &str) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMetricsProvider for ParleyMetrics {
    fn shape(&mut self, text: &str) -> FlagResult<ShapedText> {
        let layout = self.layout(text);
        let advance = f64::from(layout.full_width());

        let line = layout
            .lines()
            .next()
            .ok_or_else(|| FlagError::metrics("shaping produced no lines"))?;
        let lm = line.metrics();
        let baseline = lm.baseline;
        let metrics = TextMetrics {
            advance,
            ascent: f64::from(lm.ascent),
            descent: f64::from(lm.descent),
            line_gap: f64::from(lm.leading),
        };

        let mut glyphs = Vec::new();
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            glyphs.extend(run.glyphs().map(|g| ShapedGlyph {
                id: g.id,
                x: g.x,
                y: g.y - baseline,
            }));
        }

        Ok(ShapedText { glyphs, metrics })
    }

    fn glyph_ink_height(&mut self, _glyph: char) -> FlagResult<f64> {
        Ok(f64::from(self.size) * Self::INK_HEIGHT_RATIO)
    }
}

/// Font-table provider backed by fontdue.
pub struct FontdueMetrics {
    font: fontdue::Font,
    size: f32,
}

impl FontdueMetrics {
    pub fn new(font: &LoadedFont, size: f64) -> FlagResult<Self> {
        let settings = fontdue::FontSettings {
            collection_index: font.index,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(font.bytes.as_slice(), settings)
            .map_err(FlagError::metrics)?;
        Ok(Self {
            font,
            size: size as f32,
        })
    }
}

impl TextMetricsProvider for FontdueMetrics {
    fn shape(&mut self, text: &str) -> FlagResult<ShapedText> {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

        let lm = self
            .font
            .horizontal_line_metrics(self.size)
            .ok_or_else(|| FlagError::metrics("font has no horizontal line metrics"))?;

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(text, self.size, 0));

        // Fontdue positions bitmap corners; recover pen origins so glyph ids
        // can be drawn as outlines at baseline-relative positions.
        let mut glyphs = Vec::new();
        let mut advance = 0.0f32;
        for g in layout.glyphs() {
            let m = self.font.metrics_indexed(g.key.glyph_index, self.size);
            let origin_x = g.x - m.xmin as f32;
            advance = advance.max(origin_x + m.advance_width);
            glyphs.push(ShapedGlyph {
                id: u32::from(g.key.glyph_index),
                x: origin_x,
                y: 0.0,
            });
        }

        Ok(ShapedText {
            glyphs,
            metrics: TextMetrics {
                advance: f64::from(advance),
                ascent: f64::from(lm.ascent),
                descent: f64::from(lm.descent.abs()),
                line_gap: f64::from(lm.line_gap),
            },
        })
    }

    fn glyph_ink_height(&mut self, glyph: char) -> FlagResult<f64> {
        Ok(self.font.metrics(glyph, self.size).height as f64)
    }
}
