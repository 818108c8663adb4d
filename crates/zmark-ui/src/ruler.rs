//! 测距尺
//!
//! 单击逐点添加顶点，构成一条折线；点击首顶点附近（顶点数 ≥ 3 时）闭合为多边形。
//! 每次变化都重新计算测地长度和面积。已有顶点可以拖拽修改。
//!
//! 测距尺不是图形，不进入 [`ShapeStore`](zmark_core::store::ShapeStore)，
//! 也没有比清空更细的撤销粒度。

use serde::{Deserialize, Serialize};
use zmark_core::geodesy::{geodesic_area, geodesic_length, Vertex};
use zmark_core::math::Point2;
use zmark_core::projection::Projection;

/// 测距尺几何
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulerState {
    pub vertices: Vec<Vertex>,
    pub closed: bool,
}

impl RulerState {
    /// 用于测量长度的路径：闭合时追加首顶点
    pub fn path(&self) -> Vec<Vertex> {
        let mut path = self.vertices.clone();
        if self.closed {
            if let Some(first) = self.vertices.first() {
                path.push(*first);
            }
        }
        path
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// 实时统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RulerStats {
    /// 总长度（米）
    pub distance_m: f64,
    /// 面积（平方米），未闭合时为 0
    pub area_m2: f64,
}

impl RulerStats {
    pub fn distance_km_text(&self) -> String {
        format!("{:.2} km", self.distance_m / 1000.0)
    }

    pub fn area_km2_text(&self) -> String {
        format!("{:.2} km²", self.area_m2 / 1_000_000.0)
    }
}

/// 单击的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulerClick {
    /// 追加了顶点（索引）
    Appended(usize),
    /// 闭合为多边形
    Closed,
    /// 忽略（未启用、已闭合或刚结束拖拽）
    Ignored,
}

/// 顶点抓取
#[derive(Debug, Clone, Copy)]
struct Grab {
    index: usize,
    /// 按下时的屏幕位置
    origin: Point2,
    moved: bool,
}

/// 测距尺
#[derive(Debug, Clone)]
pub struct Ruler {
    active: bool,
    state: RulerState,
    stats: RulerStats,
    /// 闭合容差（像素）
    close_px: f64,
    /// 顶点抓取半径（像素）
    grab_px: f64,
    /// 指针离开按下点超过该距离才开始拖拽（像素）
    drag_px: f64,
    /// 正在拖拽的顶点
    drag: Option<Grab>,
    /// 已松开但尚未被单击消费的抓取
    released: Option<Grab>,
}

impl Ruler {
    pub fn new(close_px: f64, grab_px: f64, drag_px: f64) -> Self {
        Self {
            active: false,
            state: RulerState::default(),
            stats: RulerStats::default(),
            close_px,
            grab_px,
            drag_px,
            drag: None,
            released: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> &RulerState {
        &self.state
    }

    pub fn stats(&self) -> RulerStats {
        self.stats
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// 启用测距尺（总是从空白开始）
    pub fn enable(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.clear();
        tracing::info!("Ruler enabled");
    }

    /// 停用并清空
    pub fn disable(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.clear();
        tracing::info!("Ruler disabled");
    }

    /// 清空为空白、未闭合
    pub fn clear(&mut self) {
        self.state = RulerState::default();
        self.drag = None;
        self.released = None;
        self.recompute();
        tracing::debug!("Ruler cleared");
    }

    /// 地图单击
    pub fn click(&mut self, proj: &dyn Projection, p: Point2) -> RulerClick {
        if !self.active {
            return RulerClick::Ignored;
        }

        // 单击落在顶点标记上：未移动的首顶点可闭合，其它情况不加点
        if let Some(grab) = self.released.take() {
            if grab.index == 0 && !grab.moved && self.try_close() {
                return RulerClick::Closed;
            }
            return RulerClick::Ignored;
        }

        if self.state.closed {
            return RulerClick::Ignored;
        }

        if self.state.vertices.len() >= 3 {
            let first = proj.to_screen(self.state.vertices[0]);
            if proj.pixel_distance(first, p) <= self.close_px && self.try_close() {
                return RulerClick::Closed;
            }
        }

        self.state.vertices.push(proj.to_geo(p));
        self.recompute();
        RulerClick::Appended(self.state.vertices.len() - 1)
    }

    /// 按下：抓取半径内最近的顶点
    pub fn press(&mut self, proj: &dyn Projection, p: Point2) -> Option<usize> {
        self.released = None;
        if !self.active {
            return None;
        }

        let index = self
            .state
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, proj.pixel_distance(proj.to_screen(*v), p)))
            .filter(|(_, d)| *d <= self.grab_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)?;

        self.drag = Some(Grab { index, origin: p, moved: false });
        Some(index)
    }

    /// 拖拽被抓取的顶点
    ///
    /// 指针未离开按下点（单击）时顶点保持不动。
    pub fn drag_to(&mut self, proj: &dyn Projection, p: Point2) -> bool {
        let Some(grab) = self.drag.as_mut() else {
            return false;
        };
        if !grab.moved && proj.pixel_distance(grab.origin, p) <= self.drag_px {
            return false;
        }
        let Some(vertex) = self.state.vertices.get_mut(grab.index) else {
            self.drag = None;
            return false;
        };
        *vertex = proj.to_geo(p);
        grab.moved = true;
        self.recompute();
        true
    }

    /// 松开：结束拖拽
    pub fn release(&mut self) {
        self.released = self.drag.take();
    }

    /// 完成测量：顶点数足够时闭合
    pub fn finish(&mut self) -> bool {
        self.active && self.try_close()
    }

    fn try_close(&mut self) -> bool {
        if self.state.closed || self.state.vertices.len() < 3 {
            return false;
        }
        self.state.closed = true;
        self.recompute();
        tracing::info!(
            "Ruler closed: {} vertices, {}, {}",
            self.state.vertices.len(),
            self.stats.distance_km_text(),
            self.stats.area_km2_text()
        );
        true
    }

    fn recompute(&mut self) {
        let distance_m = geodesic_length(&self.state.path());
        let area_m2 = if self.state.closed {
            geodesic_area(&self.state.vertices)
        } else {
            0.0
        };
        self.stats = RulerStats { distance_m, area_m2 };
    }
}

impl Default for Ruler {
    fn default() -> Self {
        Self::new(10.0, 10.0, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmark_core::projection::WebMercator;

    fn proj() -> WebMercator {
        WebMercator::centered_on(Vertex::new(0.0, 0.0), 14.0, (800.0, 600.0))
    }

    fn active_ruler() -> Ruler {
        let mut ruler = Ruler::default();
        ruler.enable();
        ruler
    }

    fn triangle(ruler: &mut Ruler, proj: &WebMercator) {
        ruler.click(proj, Point2::new(100.0, 100.0));
        ruler.click(proj, Point2::new(100.0, 300.0));
        ruler.click(proj, Point2::new(300.0, 300.0));
    }

    #[test]
    fn test_inactive_ruler_ignores_clicks() {
        let proj = proj();
        let mut ruler = Ruler::default();
        assert_eq!(ruler.click(&proj, Point2::new(10.0, 10.0)), RulerClick::Ignored);
        assert!(ruler.state().is_empty());
    }

    #[test]
    fn test_click_near_first_vertex_closes() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);
        assert_eq!(ruler.stats().area_m2, 0.0);

        assert_eq!(ruler.click(&proj, Point2::new(106.0, 104.0)), RulerClick::Closed);
        assert!(ruler.state().closed);
        assert_eq!(ruler.state().vertices.len(), 3);
        assert!(ruler.stats().area_m2 > 0.0);

        // 闭合后不再加点
        assert_eq!(ruler.click(&proj, Point2::new(500.0, 500.0)), RulerClick::Ignored);
        assert_eq!(ruler.state().vertices.len(), 3);
    }

    #[test]
    fn test_no_close_with_two_vertices() {
        let proj = proj();
        let mut ruler = active_ruler();
        ruler.click(&proj, Point2::new(100.0, 100.0));
        ruler.click(&proj, Point2::new(200.0, 100.0));
        assert!(!ruler.finish());

        assert_eq!(ruler.click(&proj, Point2::new(101.0, 100.0)), RulerClick::Appended(2));
        assert!(!ruler.state().closed);
    }

    #[test]
    fn test_closed_distance_includes_closing_edge() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);
        let open = ruler.stats().distance_m;

        assert!(ruler.finish());
        let closed = ruler.stats().distance_m;
        let closing = geodesic_length(&[ruler.state().vertices[2], ruler.state().vertices[0]]);
        assert!((closed - open - closing).abs() < 1e-6);
    }

    #[test]
    fn test_one_km_square_area() {
        let proj = proj();
        let mut ruler = active_ruler();
        // 赤道附近 1 km ≈ 0.008993°
        let d = 1000.0 / 111_195.0;
        for v in [
            Vertex::new(0.0, 0.0),
            Vertex::new(0.0, d),
            Vertex::new(d, d),
            Vertex::new(d, 0.0),
        ] {
            ruler.click(&proj, proj.to_screen(v));
        }
        assert!(ruler.finish());
        let area = ruler.stats().area_m2;
        assert!((area - 1_000_000.0).abs() < 30_000.0, "area = {area}");
        assert_eq!(ruler.stats().area_km2_text(), "1.00 km²");
    }

    #[test]
    fn test_vertex_drag_updates_in_place() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);
        let before = ruler.stats().distance_m;

        assert_eq!(ruler.press(&proj, Point2::new(302.0, 301.0)), Some(2));
        assert!(ruler.drag_to(&proj, Point2::new(400.0, 300.0)));
        ruler.release();
        // 结束拖拽的单击不加点
        assert_eq!(ruler.click(&proj, Point2::new(400.0, 300.0)), RulerClick::Ignored);

        assert_eq!(ruler.state().vertices.len(), 3);
        let moved = proj.to_screen(ruler.state().vertices[2]);
        assert!((moved.x - 400.0).abs() < 1e-6);
        assert!(ruler.stats().distance_m > before);
    }

    #[test]
    fn test_click_on_first_marker_closes() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);

        assert_eq!(ruler.press(&proj, Point2::new(100.0, 100.0)), Some(0));
        ruler.release();
        assert_eq!(ruler.click(&proj, Point2::new(100.0, 100.0)), RulerClick::Closed);
    }

    #[test]
    fn test_tap_on_first_vertex_does_not_move_it() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);
        let first = ruler.state().vertices[0];

        // 按下、松开、单击都落在同一点
        let tap = Point2::new(104.0, 103.0);
        assert_eq!(ruler.press(&proj, tap), Some(0));
        assert!(!ruler.drag_to(&proj, tap));
        ruler.release();
        assert_eq!(ruler.click(&proj, tap), RulerClick::Closed);
        assert_eq!(ruler.state().vertices[0], first);
    }

    #[test]
    fn test_drag_within_slop_keeps_vertex() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);
        let second = ruler.state().vertices[1];

        ruler.press(&proj, Point2::new(100.0, 300.0));
        assert!(!ruler.drag_to(&proj, Point2::new(101.0, 301.0)));
        assert_eq!(ruler.state().vertices[1], second);

        // 超出阈值后开始拖拽，之后的小幅移动也生效
        assert!(ruler.drag_to(&proj, Point2::new(110.0, 300.0)));
        assert!(ruler.drag_to(&proj, Point2::new(111.0, 300.0)));
        ruler.release();
        let moved = proj.to_screen(ruler.state().vertices[1]);
        assert!((moved.x - 111.0).abs() < 1e-6);
        assert_eq!(ruler.click(&proj, Point2::new(111.0, 300.0)), RulerClick::Ignored);
    }

    #[test]
    fn test_press_away_from_vertices_allows_append() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);

        assert_eq!(ruler.press(&proj, Point2::new(500.0, 100.0)), None);
        assert!(!ruler.drag_to(&proj, Point2::new(510.0, 100.0)));
        ruler.release();
        assert_eq!(ruler.click(&proj, Point2::new(500.0, 100.0)), RulerClick::Appended(3));
    }

    #[test]
    fn test_enable_and_disable_clear() {
        let proj = proj();
        let mut ruler = active_ruler();
        triangle(&mut ruler, &proj);

        ruler.disable();
        assert!(!ruler.is_active());
        assert!(ruler.state().is_empty());
        assert_eq!(ruler.stats(), RulerStats::default());

        ruler.enable();
        assert!(ruler.is_active());
        assert!(ruler.state().is_empty());
        assert_eq!(ruler.stats().distance_km_text(), "0.00 km");
    }
}
