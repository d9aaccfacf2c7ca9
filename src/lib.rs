#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod export;
pub mod layout;
pub mod logo;
pub mod metrics;
pub mod model;
pub mod outline;
pub mod paint;
pub mod render;

pub use color::{ColorSet, Rgba};
pub use error::{FlagError, FlagResult};
pub use export::{
    ExportRect, MAX_CANVAS_DIM, export_rect, placement_origin, style_file_name, write_png,
};
pub use layout::{Layout, LogoMetrics, LogoSlot, body_height, compute_layout};
pub use logo::{LogoBitmap, decode_logo};
pub use metrics::{
    FontdueMetrics, LoadedFont, MetricsBackend, ParleyMetrics, ShapedGlyph, ShapedText,
    TextMetrics, TextMetricsProvider, create_provider, load_font,
};
pub use model::{DesignMetrics, Edge, EdgeTab, FlagSpec, StockStyle};
pub use outline::{Outline, Segment, build_outline};
pub use paint::{LogoPaint, Placement, Surface, font_data_for, paint_flag};
pub use render::{BatchReport, RenderOptions, prepare_logo, render_flag_set};
