use std::path::PathBuf;

use crate::{
    color::ColorSet,
    error::{FlagError, FlagResult},
};

/// One badge rendering request. Built once per invocation and read-only for
/// the whole 13-style batch.
#[derive(Clone, Debug)]
pub struct FlagSpec {
    pub text: String,
    pub scale: f64, // device pixels per local unit
    pub colors: ColorSet,
    pub file_prefix: String,
    pub logo_path: Option<PathBuf>,
}

impl FlagSpec {
    pub fn validate(&self) -> FlagResult<()> {
        if self.text.trim().is_empty() {
            return Err(FlagError::configuration("label text must be non-empty"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(FlagError::configuration(format!(
                "scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(FlagError::configuration("file prefix must be non-empty"));
        }
        Ok(())
    }
}

/// Fixed design constants, in local (pre-scale) units. The output scale is
/// applied as a render-time transform, never folded into these.
#[derive(Clone, Debug, serde::Serialize)]
pub struct DesignMetrics {
    pub font_size: f64,
    pub font_family: String,
    pub margin_lr: f64, // label side margin
    pub border_width: f64,
    pub corner_radius: f64,
    pub logo_margin: f64,
    pub reference_glyph: char, // body height calibration glyph
}

impl Default for DesignMetrics {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_family: "Sans".to_string(),
            margin_lr: 2.0,
            border_width: 2.0,
            corner_radius: 8.0,
            logo_margin: 8.0,
            reference_glyph: 'é',
        }
    }
}

/// Which badge edge carries the stock tab, if any, and where along it.
///
/// Styles are named from the viewer's perspective: `LeftTop` is a tab on the
/// left edge near the top. Output files use the short tags listed per
/// variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum StockStyle {
    None,         // "none"
    LeftTop,      // "lt"
    LeftCenter,   // "lc"
    LeftBottom,   // "lb"
    TopLeft,      // "tl"
    TopCenter,    // "tc"
    TopRight,     // "tr"
    RightTop,     // "rt"
    RightCenter,  // "rc"
    RightBottom,  // "rb"
    BottomRight,  // "br"
    BottomCenter, // "bc"
    BottomLeft,   // "bl"
}

/// Badge edges, in clockwise outline order starting at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Tab placement along one edge, relative to the clockwise traversal of the
/// outline (the top edge runs left to right, the left edge bottom to top).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTab {
    NearStart,
    Centered,
    NearEnd,
}

impl StockStyle {
    /// Every variant, in the fixed batch output order.
    pub const ALL: [StockStyle; 13] = [
        StockStyle::None,
        StockStyle::LeftTop,
        StockStyle::LeftCenter,
        StockStyle::LeftBottom,
        StockStyle::TopLeft,
        StockStyle::TopCenter,
        StockStyle::TopRight,
        StockStyle::RightTop,
        StockStyle::RightCenter,
        StockStyle::RightBottom,
        StockStyle::BottomRight,
        StockStyle::BottomCenter,
        StockStyle::BottomLeft,
    ];

    /// Short tag used in output file names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LeftTop => "lt",
            Self::LeftCenter => "lc",
            Self::LeftBottom => "lb",
            Self::TopLeft => "tl",
            Self::TopCenter => "tc",
            Self::TopRight => "tr",
            Self::RightTop => "rt",
            Self::RightCenter => "rc",
            Self::RightBottom => "rb",
            Self::BottomRight => "br",
            Self::BottomCenter => "bc",
            Self::BottomLeft => "bl",
        }
    }

    /// Decomposes the variant into (edge, placement along that edge).
    pub fn tab(self) -> Option<(Edge, EdgeTab)> {
        match self {
            Self::None => None,
            Self::LeftTop => Some((Edge::Left, EdgeTab::NearEnd)),
            Self::LeftCenter => Some((Edge::Left, EdgeTab::Centered)),
            Self::LeftBottom => Some((Edge::Left, EdgeTab::NearStart)),
            Self::TopLeft => Some((Edge::Top, EdgeTab::NearStart)),
            Self::TopCenter => Some((Edge::Top, EdgeTab::Centered)),
            Self::TopRight => Some((Edge::Top, EdgeTab::NearEnd)),
            Self::RightTop => Some((Edge::Right, EdgeTab::NearStart)),
            Self::RightCenter => Some((Edge::Right, EdgeTab::Centered)),
            Self::RightBottom => Some((Edge::Right, EdgeTab::NearEnd)),
            Self::BottomRight => Some((Edge::Bottom, EdgeTab::NearStart)),
            Self::BottomCenter => Some((Edge::Bottom, EdgeTab::Centered)),
            Self::BottomLeft => Some((Edge::Bottom, EdgeTab::NearEnd)),
        }
    }

    pub fn tab_edge(self) -> Option<Edge> {
        self.tab().map(|(edge, _)| edge)
    }
}

impl std::fmt::Display for StockStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
