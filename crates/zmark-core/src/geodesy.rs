//! 地理坐标与测地计算
//!
//! 距离采用球面大圆（haversine）公式，面积采用球面多边形面积公式。
//! 两者都是球面近似，误差在测距尺的展示精度（0.01 km）以内。

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 平均地球半径（米），用于大圆距离
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.8;

/// WGS84 长半轴（米），用于球面面积
pub const WGS84_A: f64 = 6_378_137.0;

/// 地理坐标（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub lat: f64,
    pub lon: f64,
}

/// 坐标文本解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateParseError {
    #[error("Invalid coordinate format: {0}")]
    InvalidFormat(String),

    #[error("Latitude out of range: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range: {0}")]
    LongitudeOutOfRange(f64),
}

impl Vertex {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 解析 "纬度, 经度" 文本，例如 `48.25292, 37.22646`
    pub fn parse(input: &str) -> Result<Self, CoordinateParseError> {
        let input = input.trim();
        let (lat_str, lon_str) = input
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::InvalidFormat(input.to_string()))?;

        let lat = parse_decimal(lat_str.trim())
            .ok_or_else(|| CoordinateParseError::InvalidFormat(input.to_string()))?;
        let lon = parse_decimal(lon_str.trim())
            .ok_or_else(|| CoordinateParseError::InvalidFormat(input.to_string()))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateParseError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateParseError::LongitudeOutOfRange(lon));
        }

        Ok(Self::new(lat, lon))
    }

    /// 到另一点的大圆距离（米）
    pub fn distance_to(&self, other: &Vertex) -> f64 {
        haversine_distance(*self, *other)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// 只接受 `[+-]数字[.数字]`，拒绝指数、inf、NaN 等写法
fn parse_decimal(s: &str) -> Option<f64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    s.parse::<f64>().ok()
}

/// 两点间的大圆距离（米）
pub fn haversine_distance(a: Vertex, b: Vertex) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// 折线的测地长度（米）：相邻顶点大圆距离之和
pub fn geodesic_length(vertices: &[Vertex]) -> f64 {
    vertices
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// 闭合环的球面面积（平方米，取绝对值）
///
/// 环可以带或不带重复的首点。
pub fn geodesic_area(ring: &[Vertex]) -> f64 {
    let ring = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    };

    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        let p3 = ring[(i + 2) % n];
        total += (p3.lon.to_radians() - p1.lon.to_radians()) * p2.lat.to_radians().sin();
    }

    (total * WGS84_A * WGS84_A / 2.0).abs()
}
