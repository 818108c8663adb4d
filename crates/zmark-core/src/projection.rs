//! 投影适配器
//!
//! 底图负责地理坐标与屏幕像素之间的换算，标注引擎只通过 [`Projection`]
//! 使用它。投影可能在两次调用之间变化（缩放/平移），因此调用方不得缓存
//! 像素位置，每次都应从 [`Vertex`] 重新投影。

use crate::geodesy::{haversine_distance, Vertex};
use crate::math::{Point2, Vector2};
use std::f64::consts::PI;

/// 地理坐标 ⇄ 屏幕像素 的换算接口
pub trait Projection {
    /// 地理坐标 -> 屏幕像素
    fn to_screen(&self, vertex: Vertex) -> Point2;

    /// 屏幕像素 -> 地理坐标
    fn to_geo(&self, point: Point2) -> Vertex;

    /// 两个屏幕点之间的像素距离
    fn pixel_distance(&self, a: Point2, b: Point2) -> f64 {
        (b - a).norm()
    }

    /// 两个地理坐标之间的测地距离（米）
    fn geodesic_distance(&self, a: Vertex, b: Vertex) -> f64 {
        haversine_distance(a, b)
    }

    /// 屏幕点附近一个像素对应的地面距离（米）
    fn meters_per_pixel(&self, at: Point2) -> f64 {
        let a = self.to_geo(at);
        let b = self.to_geo(at + Vector2::new(1.0, 0.0));
        self.geodesic_distance(a, b)
    }
}

/// 瓦片尺寸（像素）
const TILE_SIZE: f64 = 256.0;

/// Web 墨卡托投影（与常见瓦片底图一致）
///
/// 作为参考实现，供回放程序和测试使用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    /// 缩放级别（可为小数）
    pub zoom: f64,
    /// 屏幕左上角在世界像素坐标中的位置
    pub origin: Point2,
}

impl WebMercator {
    pub fn new(zoom: f64, origin: Point2) -> Self {
        Self { zoom, origin }
    }

    /// 以 `center` 为视口中心创建投影
    pub fn centered_on(center: Vertex, zoom: f64, viewport: (f64, f64)) -> Self {
        let mut proj = Self::new(zoom, Point2::origin());
        let world = proj.world_pixel(center);
        proj.origin = Point2::new(world.x - viewport.0 / 2.0, world.y - viewport.1 / 2.0);
        proj
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn world_pixel(&self, vertex: Vertex) -> Point2 {
        let size = self.world_size();
        let lat = vertex.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
        let x = (vertex.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        Point2::new(x, y)
    }

    /// 平移视口（像素）
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.origin += Vector2::new(dx, dy);
    }

    /// 保持屏幕点 `anchor` 下的地理位置不变的缩放
    pub fn zoom_around(&mut self, zoom: f64, anchor: Point2) {
        let geo = self.to_geo(anchor);
        self.zoom = zoom;
        let world = self.world_pixel(geo);
        self.origin = Point2::new(world.x - anchor.x, world.y - anchor.y);
    }
}

impl Projection for WebMercator {
    fn to_screen(&self, vertex: Vertex) -> Point2 {
        let world = self.world_pixel(vertex);
        Point2::new(world.x - self.origin.x, world.y - self.origin.y)
    }

    fn to_geo(&self, point: Point2) -> Vertex {
        let size = self.world_size();
        let x = point.x + self.origin.x;
        let y = point.y + self.origin.y;
        let lon = x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / size);
        let lat = n.sinh().atan().to_degrees();
        Vertex::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_viewport_center() {
        let center = Vertex::new(48.0, 37.0);
        let proj = WebMercator::centered_on(center, 10.0, (800.0, 600.0));
        let p = proj.to_screen(center);
        assert!((p.x - 400.0).abs() < 1e-6);
        assert!((p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_projection() {
        let proj = WebMercator::centered_on(Vertex::new(10.0, 20.0), 12.0, (800.0, 600.0));
        let v = Vertex::new(10.01, 19.98);
        let back = proj.to_geo(proj.to_screen(v));
        assert!((back.lat - v.lat).abs() < 1e-9);
        assert!((back.lon - v.lon).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_around_keeps_anchor() {
        let mut proj = WebMercator::centered_on(Vertex::new(0.0, 0.0), 5.0, (800.0, 600.0));
        let anchor = Point2::new(100.0, 100.0);
        let before = proj.to_geo(anchor);
        proj.zoom_around(7.5, anchor);
        let after = proj.to_geo(anchor);
        assert!((before.lat - after.lat).abs() < 1e-9);
        assert!((before.lon - after.lon).abs() < 1e-9);
    }

    #[test]
    fn test_meters_per_pixel_at_equator() {
        // 0 级、赤道处约 156 km/像素
        let proj = WebMercator::centered_on(Vertex::new(0.0, 0.0), 0.0, (256.0, 256.0));
        let mpp = proj.meters_per_pixel(Point2::new(128.0, 128.0));
        assert!((mpp - 156_370.0).abs() < 500.0, "got {mpp}");
    }
}
