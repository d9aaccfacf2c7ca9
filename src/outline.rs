use std::f64::consts::PI;

use kurbo::Point;

use crate::{
    error::{FlagError, FlagResult},
    layout::Layout,
    model::{DesignMetrics, Edge, EdgeTab, StockStyle},
};

/// Curve flattening tolerance when arcs are lowered to cubics.
const ARC_TOLERANCE: f64 = 0.1;

/// Matching tolerance for the implicit connecting line in front of an arc.
const CONNECT_EPS: f64 = 1e-9;

/// One outline piece, in local (pre-scale) coordinates with y pointing
/// down. Arc angles follow the screen convention: 0 points right, angles
/// grow clockwise, so a top-left corner sweeps PI to 1.5*PI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Line {
        to: Point,
    },
}

impl Segment {
    /// Traversal end point of the segment.
    pub fn end(&self) -> Point {
        match *self {
            Segment::Arc {
                center,
                radius,
                end_angle,
                ..
            } => point_at(center, radius, end_angle),
            Segment::Line { to } => to,
        }
    }
}

fn point_at(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// The badge contour: four corner arcs joined by edge runs, at most one of
/// them interrupted by the stock tab. Always one closed loop.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    start: Point,
    segments: Vec<Segment>,
}

impl Outline {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// End of the last segment before the path closes. Equal to `start`
    /// except when the left edge carries a tab, in which case the closing
    /// line runs up the remaining straight part of that edge.
    pub fn end_point(&self) -> Point {
        self.segments.last().map_or(self.start, |s| s.end())
    }

    /// Lowers the outline to a closed bezier path. A line is inserted in
    /// front of any arc whose start does not coincide with the current
    /// point, so tab edges reconnect to their corner without explicit
    /// segments.
    pub fn to_bez_path(&self) -> kurbo::BezPath {
        let mut path = kurbo::BezPath::new();
        path.move_to(self.start);
        let mut cursor = self.start;

        for seg in &self.segments {
            match *seg {
                Segment::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let start = point_at(center, radius, start_angle);
                    if (start.x - cursor.x).abs() > CONNECT_EPS
                        || (start.y - cursor.y).abs() > CONNECT_EPS
                    {
                        path.line_to(start);
                    }
                    let arc = kurbo::Arc::new(
                        center,
                        (radius, radius),
                        start_angle,
                        end_angle - start_angle,
                        0.0,
                    );
                    arc.to_cubic_beziers(ARC_TOLERANCE, |p1, p2, p3| {
                        path.curve_to(p1, p2, p3);
                    });
                    cursor = point_at(center, radius, end_angle);
                }
                Segment::Line { to } => {
                    path.line_to(to);
                    cursor = to;
                }
            }
        }

        path.close_path();
        path
    }
}

/// Builds the closed contour for one style. Deterministic: equal inputs
/// yield an identical segment list.
///
/// Construction runs clockwise from the top-left corner arc. A plain edge
/// contributes one line to the next corner; a tab edge contributes three
/// (first base corner, apex, second base corner) and relies on the implicit
/// connecting line back to the corner arc.
pub fn build_outline(
    layout: &Layout,
    style: StockStyle,
    design: &DesignMetrics,
) -> FlagResult<Outline> {
    let w = layout.body_width;
    let h = layout.body_height;
    let r = design.corner_radius;

    if w <= 2.0 * r || h <= 2.0 * r {
        return Err(FlagError::geometry(format!(
            "body {w:.2}x{h:.2} cannot fit corner radius {r}"
        )));
    }

    let tab = style.tab();
    let tab_on = |edge: Edge| tab.and_then(|(e, t)| (e == edge).then_some(t));

    let mut segments = Vec::with_capacity(12);
    segments.push(Segment::Arc {
        center: Point::new(r, r),
        radius: r,
        start_angle: PI,
        end_angle: 1.5 * PI,
    });
    push_edge(&mut segments, Edge::Top, tab_on(Edge::Top), layout, r)?;
    segments.push(Segment::Arc {
        center: Point::new(w - r, r),
        radius: r,
        start_angle: 1.5 * PI,
        end_angle: 2.0 * PI,
    });
    push_edge(&mut segments, Edge::Right, tab_on(Edge::Right), layout, r)?;
    segments.push(Segment::Arc {
        center: Point::new(w - r, h - r),
        radius: r,
        start_angle: 0.0,
        end_angle: 0.5 * PI,
    });
    push_edge(&mut segments, Edge::Bottom, tab_on(Edge::Bottom), layout, r)?;
    segments.push(Segment::Arc {
        center: Point::new(r, h - r),
        radius: r,
        start_angle: 0.5 * PI,
        end_angle: PI,
    });
    push_edge(&mut segments, Edge::Left, tab_on(Edge::Left), layout, r)?;

    Ok(Outline {
        start: Point::new(0.0, r),
        segments,
    })
}

fn push_edge(
    segments: &mut Vec<Segment>,
    edge: Edge,
    tab: Option<EdgeTab>,
    layout: &Layout,
    r: f64,
) -> FlagResult<()> {
    let w = layout.body_width;
    let h = layout.body_height;
    let sh = layout.stock_height;
    let sw = layout.stock_width;

    let Some(tab) = tab else {
        let to = match edge {
            Edge::Top => Point::new(w - r, 0.0),
            Edge::Right => Point::new(w, h - r),
            Edge::Bottom => Point::new(r, h),
            Edge::Left => Point::new(0.0, r),
        };
        segments.push(Segment::Line { to });
        return Ok(());
    };

    let len = match edge {
        Edge::Top | Edge::Bottom => w,
        Edge::Left | Edge::Right => h,
    };

    // Anchor in the edge's axis coordinate. NearStart/NearEnd are relative
    // to the clockwise traversal, which runs against the axis on the bottom
    // and left edges.
    let near_lo = r + sw / 2.0;
    let near_hi = len - r - sw / 2.0;
    let anchor = match tab {
        EdgeTab::Centered => match edge {
            Edge::Top | Edge::Bottom => layout.text_anchor.x + layout.text_width / 2.0,
            Edge::Left | Edge::Right => h / 2.0,
        },
        EdgeTab::NearStart => match edge {
            Edge::Top | Edge::Right => near_lo,
            Edge::Bottom | Edge::Left => near_hi,
        },
        EdgeTab::NearEnd => match edge {
            Edge::Top | Edge::Right => near_hi,
            Edge::Bottom | Edge::Left => near_lo,
        },
    };

    let lo = anchor - sw / 2.0;
    let hi = anchor + sw / 2.0;
    if lo < r || hi > len - r {
        return Err(FlagError::geometry(format!(
            "stock base [{lo:.2}, {hi:.2}] exceeds the straight run [{r:.2}, {:.2}] of the {edge:?} edge",
            len - r
        )));
    }

    match edge {
        Edge::Top => {
            segments.push(Segment::Line {
                to: Point::new(lo, 0.0),
            });
            segments.push(Segment::Line {
                to: Point::new(anchor, -sh),
            });
            segments.push(Segment::Line {
                to: Point::new(hi, 0.0),
            });
        }
        Edge::Right => {
            segments.push(Segment::Line {
                to: Point::new(w, lo),
            });
            segments.push(Segment::Line {
                to: Point::new(w + sh, anchor),
            });
            segments.push(Segment::Line {
                to: Point::new(w, hi),
            });
        }
        Edge::Bottom => {
            segments.push(Segment::Line {
                to: Point::new(hi, h),
            });
            segments.push(Segment::Line {
                to: Point::new(anchor, h + sh),
            });
            segments.push(Segment::Line {
                to: Point::new(lo, h),
            });
        }
        Edge::Left => {
            segments.push(Segment::Line {
                to: Point::new(0.0, hi),
            });
            segments.push(Segment::Line {
                to: Point::new(-sh, anchor),
            });
            segments.push(Segment::Line {
                to: Point::new(0.0, lo),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ShapedText, TextMetrics};

    fn test_layout(body_width: f64, body_height: f64) -> Layout {
        Layout {
            body_width,
            body_height,
            text_width: body_width - 8.0,
            text_anchor: Point::new(4.0, body_height * 0.75),
            stock_height: body_height / 2.0,
            stock_width: body_height / 4.0,
            logo: None,
            shaped: ShapedText {
                glyphs: vec![],
                metrics: TextMetrics {
                    advance: body_width - 8.0,
                    ascent: 12.0,
                    descent: 4.0,
                    line_gap: 2.0,
                },
            },
        }
    }

    #[test]
    fn plain_contour_closes_exactly() {
        let layout = test_layout(60.0, 24.0);
        let design = DesignMetrics::default();
        let outline = build_outline(&layout, StockStyle::None, &design).unwrap();

        assert_eq!(outline.segments().len(), 8);
        assert_eq!(outline.end_point(), outline.start());
    }

    #[test]
    fn every_tab_adds_exactly_two_segments() {
        let layout = test_layout(60.0, 24.0);
        let design = DesignMetrics::default();
        let base = build_outline(&layout, StockStyle::None, &design)
            .unwrap()
            .segments()
            .len();

        for style in StockStyle::ALL {
            if style == StockStyle::None {
                continue;
            }
            let outline = build_outline(&layout, style, &design).unwrap();
            assert_eq!(outline.segments().len(), base + 2, "style {style}");
        }
    }

    #[test]
    fn left_tab_close_runs_along_the_edge() {
        let layout = test_layout(60.0, 24.0);
        let design = DesignMetrics::default();
        let outline = build_outline(&layout, StockStyle::LeftCenter, &design).unwrap();

        // The last explicit point sits on the left edge above the start, so
        // the closing line stays vertical.
        let end = outline.end_point();
        assert_eq!(end.x, 0.0);
        assert!(end.y >= design.corner_radius);
        assert_eq!(outline.start(), Point::new(0.0, design.corner_radius));
    }

    #[test]
    fn rejects_body_smaller_than_corner_radii() {
        let layout = test_layout(14.0, 24.0);
        let design = DesignMetrics::default();
        let err = build_outline(&layout, StockStyle::None, &design).unwrap_err();
        assert!(err.to_string().contains("geometry too small:"));
    }

    #[test]
    fn rejects_tab_base_reaching_into_corners() {
        // Height 18 leaves a 2-unit straight run on the left edge, shorter
        // than the 4.5-unit tab base.
        let layout = test_layout(60.0, 18.0);
        let design = DesignMetrics::default();
        let err = build_outline(&layout, StockStyle::LeftCenter, &design).unwrap_err();
        assert!(err.to_string().contains("geometry too small:"));
        assert!(build_outline(&layout, StockStyle::None, &design).is_ok());
    }

    #[test]
    fn apex_protrudes_by_stock_height() {
        let layout = test_layout(60.0, 24.0);
        let design = DesignMetrics::default();

        let top = build_outline(&layout, StockStyle::TopCenter, &design).unwrap();
        let min_y = top
            .segments()
            .iter()
            .map(|s| s.end().y)
            .fold(f64::INFINITY, f64::min);
        assert!((min_y - (-layout.stock_height)).abs() < 1e-9);

        let right = build_outline(&layout, StockStyle::RightCenter, &design).unwrap();
        let max_x = right
            .segments()
            .iter()
            .map(|s| s.end().x)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!((max_x - (layout.body_width + layout.stock_height)).abs() < 1e-9);
    }

    #[test]
    fn bez_path_is_closed() {
        let layout = test_layout(60.0, 24.0);
        let design = DesignMetrics::default();
        for style in StockStyle::ALL {
            let path = build_outline(&layout, style, &design)
                .unwrap()
                .to_bez_path();
            let els: Vec<kurbo::PathEl> = path.elements().to_vec();
            assert!(matches!(els.first(), Some(kurbo::PathEl::MoveTo(_))));
            assert!(matches!(els.last(), Some(kurbo::PathEl::ClosePath)));
        }
    }
}
