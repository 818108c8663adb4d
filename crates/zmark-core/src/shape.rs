//! 标注图形定义
//!
//! 支持的图形：
//! - 手绘 (Freehand)
//! - 直线 (Line)
//! - 箭头 (Arrow)，箭杆与头部作为一个整体存储
//! - 矩形 (Rectangle)
//! - 圆 (Circle)
//! - 便签 (Note)
//!
//! 图形的控制点一律是地理坐标；命中测试时才按当前投影换算到屏幕。

use crate::geodesy::Vertex;
use crate::geometry::{
    build_arrow_head, circle_contains, distance_point_to_polyline, distance_point_to_ring,
    distance_point_to_segment, point_in_polygon, ArrowHeadStyle,
};
use crate::math::Point2;
use crate::projection::Projection;
use crate::properties::Stroke;
use crate::rich_text::RichText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 命中测试容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTolerance {
    /// 线类图形的最小容差（像素），实际容差为 max(该值, 线宽)
    pub min_stroke_px: f64,
    /// 便签锚点的命中半径（像素）
    pub note_radius_px: f64,
}

impl HitTolerance {
    /// 线宽为 `weight` 的图形的命中容差
    pub fn for_stroke(&self, weight: f64) -> f64 {
        self.min_stroke_px.max(weight)
    }
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            min_stroke_px: 8.0,
            note_radius_px: 16.0,
        }
    }
}

/// 图形类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Freehand,
    Line,
    Arrow,
    Rectangle,
    Circle,
    Note,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Freehand => "freehand",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Note => "note",
        }
    }
}

/// 图形枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Freehand(Freehand),
    Line(Line),
    Arrow(Arrow),
    Rectangle(Rectangle),
    Circle(Circle),
    Note(Note),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Note(_) => ShapeKind::Note,
        }
    }

    /// 描边样式（便签没有描边）
    pub fn stroke(&self) -> Option<Stroke> {
        match self {
            Shape::Freehand(f) => Some(f.stroke),
            Shape::Line(l) => Some(l.stroke),
            Shape::Arrow(a) => Some(a.stroke),
            Shape::Rectangle(r) => Some(r.stroke),
            Shape::Circle(c) => Some(c.stroke),
            Shape::Note(_) => None,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Shape::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            Shape::Note(note) => Some(note),
            _ => None,
        }
    }

    /// 检查屏幕点 `p` 是否命中图形
    ///
    /// 每次都从地理坐标重新投影，不依赖缓存的像素位置。
    pub fn hit_test(&self, p: Point2, proj: &dyn Projection, tol: &HitTolerance) -> bool {
        match self {
            Shape::Freehand(f) => {
                let pts: Vec<Point2> = f.points.iter().map(|v| proj.to_screen(*v)).collect();
                distance_point_to_polyline(p, &pts) <= tol.for_stroke(f.stroke.weight)
            }
            Shape::Line(l) => {
                let d = distance_point_to_segment(p, proj.to_screen(l.a), proj.to_screen(l.b));
                d <= tol.for_stroke(l.stroke.weight)
            }
            Shape::Arrow(a) => {
                let t = tol.for_stroke(a.stroke.weight);
                let shaft = distance_point_to_segment(
                    p,
                    proj.to_screen(a.shaft[0]),
                    proj.to_screen(a.shaft[1]),
                );
                let head: Vec<Point2> = a.head.iter().map(|v| proj.to_screen(*v)).collect();
                shaft <= t || point_in_polygon(p, &head) || distance_point_to_ring(p, &head) <= t
            }
            Shape::Rectangle(r) => {
                let ring: Vec<Point2> = r.corners().iter().map(|v| proj.to_screen(*v)).collect();
                point_in_polygon(p, &ring)
                    || distance_point_to_ring(p, &ring) <= tol.for_stroke(r.stroke.weight)
            }
            Shape::Circle(c) => {
                // 描边容差换算为地面距离
                let center_px = proj.to_screen(c.center);
                let slack = tol.for_stroke(c.stroke.weight) * proj.meters_per_pixel(center_px);
                circle_contains(proj.to_geo(p), c.center, c.radius_m + slack)
            }
            Shape::Note(n) => (proj.to_screen(n.anchor) - p).norm() <= tol.note_radius_px,
        }
    }
}

/// 手绘折线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub points: Vec<Vertex>,
    pub stroke: Stroke,
}

/// 直线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: Vertex,
    pub b: Vertex,
    pub stroke: Stroke,
}

/// 箭头：箭杆已截断到头部底边，头部为三角形
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    /// 起点 -> 头部底边中点
    pub shaft: [Vertex; 2],
    /// 尖端、左、右
    pub head: [Vertex; 3],
    pub stroke: Stroke,
}

impl Arrow {
    /// 按当前投影在像素空间构造箭头，再换算回地理坐标
    ///
    /// 屏幕长度不超过头部长度时返回 `None`：此时底边会落到起点之后。
    pub fn build(
        from: Vertex,
        to: Vertex,
        stroke: Stroke,
        style: &ArrowHeadStyle,
        proj: &dyn Projection,
    ) -> Option<Self> {
        let a = proj.to_screen(from);
        let b = proj.to_screen(to);
        let size = style.size_for(stroke.weight);
        if proj.pixel_distance(a, b) <= size {
            return None;
        }
        let head = build_arrow_head(a, b, size, style.half_angle_deg)?;

        Some(Self {
            shaft: [from, proj.to_geo(head.base)],
            head: [to, proj.to_geo(head.left), proj.to_geo(head.right)],
            stroke,
        })
    }

    pub fn tip(&self) -> Vertex {
        self.head[0]
    }
}

/// 矩形（两个对角点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub corner1: Vertex,
    pub corner2: Vertex,
    pub stroke: Stroke,
}

impl Rectangle {
    /// 四个角点，按环的顺序排列
    pub fn corners(&self) -> [Vertex; 4] {
        let (c1, c2) = (self.corner1, self.corner2);
        [
            c1,
            Vertex::new(c1.lat, c2.lon),
            c2,
            Vertex::new(c2.lat, c1.lon),
        ]
    }
}

/// 圆（半径为地面距离）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vertex,
    pub radius_m: f64,
    pub stroke: Stroke,
}

/// 地图便签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// 客户端生成的标识
    pub id: Uuid,
    pub anchor: Vertex,
    pub text: RichText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 外部上传完成后回填的图片地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(anchor: Vertex) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            text: RichText::new(),
            title: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::WebMercator;

    fn proj() -> WebMercator {
        WebMercator::centered_on(Vertex::new(0.0, 0.0), 14.0, (800.0, 600.0))
    }

    #[test]
    fn test_line_hit_tolerance() {
        let proj = proj();
        let a = proj.to_geo(Point2::new(100.0, 100.0));
        let b = proj.to_geo(Point2::new(300.0, 100.0));
        let line = Shape::Line(Line { a, b, stroke: Stroke::default() });
        let tol = HitTolerance::default();

        assert!(line.hit_test(Point2::new(200.0, 100.0), &proj, &tol));
        assert!(line.hit_test(Point2::new(200.0, 107.0), &proj, &tol));
        assert!(!line.hit_test(Point2::new(200.0, 110.0), &proj, &tol));

        // 粗线的容差随线宽增大
        let thick = Shape::Line(Line { a, b, stroke: Stroke::new(Default::default(), 12.0) });
        assert!(thick.hit_test(Point2::new(200.0, 110.0), &proj, &tol));
    }

    #[test]
    fn test_rectangle_hit_inside_and_outline() {
        let proj = proj();
        let rect = Shape::Rectangle(Rectangle {
            corner1: proj.to_geo(Point2::new(100.0, 100.0)),
            corner2: proj.to_geo(Point2::new(200.0, 200.0)),
            stroke: Stroke::default(),
        });
        let tol = HitTolerance::default();

        assert!(rect.hit_test(Point2::new(150.0, 150.0), &proj, &tol));
        assert!(rect.hit_test(Point2::new(205.0, 150.0), &proj, &tol));
        assert!(!rect.hit_test(Point2::new(250.0, 150.0), &proj, &tol));
    }

    #[test]
    fn test_circle_hit_uses_geodesic_radius() {
        let proj = proj();
        let center = proj.to_geo(Point2::new(400.0, 300.0));
        let edge = proj.to_geo(Point2::new(450.0, 300.0));
        let radius_m = center.distance_to(&edge);
        let circle = Shape::Circle(Circle { center, radius_m, stroke: Stroke::default() });
        let tol = HitTolerance::default();

        assert!(circle.hit_test(Point2::new(420.0, 300.0), &proj, &tol));
        assert!(circle.hit_test(Point2::new(455.0, 300.0), &proj, &tol));
        assert!(!circle.hit_test(Point2::new(470.0, 300.0), &proj, &tol));
    }

    #[test]
    fn test_note_hit_radius() {
        let proj = proj();
        let note = Shape::Note(Note::new(proj.to_geo(Point2::new(400.0, 300.0))));
        let tol = HitTolerance::default();

        assert!(note.hit_test(Point2::new(410.0, 310.0), &proj, &tol));
        assert!(!note.hit_test(Point2::new(420.0, 300.0), &proj, &tol));
    }

    #[test]
    fn test_arrow_build_truncates_shaft() {
        let proj = proj();
        let from = proj.to_geo(Point2::new(100.0, 300.0));
        let to = proj.to_geo(Point2::new(300.0, 300.0));
        let arrow = Arrow::build(from, to, Stroke::default(), &ArrowHeadStyle::default(), &proj)
            .unwrap();

        let base = proj.to_screen(arrow.shaft[1]);
        assert!((base.x - 290.0).abs() < 1e-6);
        assert!((base.y - 300.0).abs() < 1e-6);
        assert_eq!(arrow.tip(), to);

        let shape = Shape::Arrow(arrow);
        let tol = HitTolerance::default();
        assert!(shape.hit_test(Point2::new(200.0, 300.0), &proj, &tol));
        assert!(shape.hit_test(Point2::new(296.0, 301.0), &proj, &tol));
    }

    #[test]
    fn test_arrow_build_degenerate() {
        let proj = proj();
        let v = Vertex::new(0.0, 0.0);
        assert!(Arrow::build(v, v, Stroke::default(), &ArrowHeadStyle::default(), &proj).is_none());
    }

    #[test]
    fn test_arrow_build_rejects_shaft_shorter_than_head() {
        let proj = proj();
        let style = ArrowHeadStyle::default();
        let from = proj.to_geo(Point2::new(100.0, 100.0));

        // 默认线宽 3 -> 头部 10 像素
        let short = proj.to_geo(Point2::new(105.0, 100.0));
        assert!(Arrow::build(from, short, Stroke::default(), &style, &proj).is_none());

        // 粗线头部更长：线宽 5 -> 16 像素
        let to = proj.to_geo(Point2::new(112.0, 100.0));
        assert!(Arrow::build(from, to, Stroke::default(), &style, &proj).is_some());
        assert!(Arrow::build(from, to, Stroke::new(Default::default(), 5.0), &style, &proj).is_none());

        let arrow = Arrow::build(from, to, Stroke::default(), &style, &proj).unwrap();
        let base = proj.to_screen(arrow.shaft[1]);
        assert!(base.x > 100.0 && base.x < 112.0);
    }
}
