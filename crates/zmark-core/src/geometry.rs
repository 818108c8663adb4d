//! 几何内核
//!
//! 无状态的纯函数：
//! - 点到线段距离（像素空间）
//! - 点在多边形内（射线法，奇偶规则，像素空间）
//! - 圆包含测试（测地距离）
//! - 箭头头部构造（像素空间）
//! - 测地长度/面积（见 [`crate::geodesy`]）
//!
//! 像素空间的函数要求调用方先用 [`crate::projection::Projection`]
//! 把顶点投影到屏幕平面。

use crate::geodesy::{haversine_distance, Vertex};
use crate::math::{rotate90, Point2, EPSILON};
use serde::{Deserialize, Serialize};

pub use crate::geodesy::{geodesic_area, geodesic_length};

/// 点到线段的距离（像素）
///
/// 投影参数被截断到 [0, 1]，退化线段按点处理。
pub fn distance_point_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let v = b - a;
    let w = p - a;

    let c1 = w.dot(&v);
    if c1 <= 0.0 {
        return (p - a).norm();
    }

    let c2 = v.dot(&v);
    if c2 <= c1 {
        return (p - b).norm();
    }

    let t = c1 / c2;
    let projected = a + v * t;
    (p - projected).norm()
}

/// 点到折线（开放）的最小距离；空折线返回 `f64::MAX`
pub fn distance_point_to_polyline(p: Point2, points: &[Point2]) -> f64 {
    match points {
        [] => f64::MAX,
        [only] => (p - *only).norm(),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(p, w[0], w[1]))
            .fold(f64::MAX, f64::min),
    }
}

/// 点到闭合环边界的最小距离
pub fn distance_point_to_ring(p: Point2, ring: &[Point2]) -> f64 {
    let n = ring.len();
    if n < 2 {
        return distance_point_to_polyline(p, ring);
    }
    (0..n)
        .map(|i| distance_point_to_segment(p, ring[i], ring[(i + 1) % n]))
        .fold(f64::MAX, f64::min)
}

/// 射线法判断点是否在多边形内（奇偶规则）
///
/// `ring` 不需要重复首点，少于3个顶点时总是返回 false。
pub fn point_in_polygon(p: Point2, ring: &[Point2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// 点到圆心的测地距离是否不超过半径
pub fn circle_contains(p: Vertex, center: Vertex, radius_meters: f64) -> bool {
    haversine_distance(p, center) <= radius_meters
}

/// 箭头头部（像素空间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    /// 箭头尖端，即拖拽终点
    pub tip: Point2,
    /// 头部底边中点，箭杆在此截断
    pub base: Point2,
    pub left: Point2,
    pub right: Point2,
}

impl ArrowHead {
    /// 三角形顶点（尖端、左、右）
    pub fn triangle(&self) -> [Point2; 3] {
        [self.tip, self.left, self.right]
    }
}

/// 箭头头部尺寸参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowHeadStyle {
    /// 头部最小长度（像素）
    pub min_size_px: f64,
    /// 每单位线宽对应的头部长度
    pub size_per_weight: f64,
    /// 半顶角（度）
    pub half_angle_deg: f64,
}

impl ArrowHeadStyle {
    /// 给定线宽时的头部长度：max(10, 线宽 × 3.2)
    pub fn size_for(&self, stroke_weight: f64) -> f64 {
        self.min_size_px.max(stroke_weight * self.size_per_weight)
    }
}

impl Default for ArrowHeadStyle {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            size_per_weight: 3.2,
            half_angle_deg: 28.0,
        }
    }
}

/// 构造箭头头部
///
/// `u = normalize(b - a)`，`base = b - u·size`，`n = rotate90(u)`，
/// 左右两点为 `base ± n·tan(半顶角)·size`。`a` 与 `b` 重合时无方向，返回 `None`。
pub fn build_arrow_head(a: Point2, b: Point2, size_px: f64, half_angle_deg: f64) -> Option<ArrowHead> {
    let d = b - a;
    let len = d.norm();
    if len < EPSILON {
        return None;
    }

    let u = d / len;
    let base = b - u * size_px;
    let n = rotate90(u);
    let half_width = half_angle_deg.to_radians().tan() * size_px;

    Some(ArrowHead {
        tip: b,
        base,
        left: base + n * half_width,
        right: base - n * half_width,
    })
}
