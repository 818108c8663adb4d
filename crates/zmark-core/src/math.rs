//! 屏幕平面数学类型
//!
//! 几何内核中所有像素空间的计算都基于 nalgebra 的二维类型。

/// 屏幕像素点
pub type Point2 = nalgebra::Point2<f64>;

/// 屏幕像素向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 浮点比较容差
pub const EPSILON: f64 = 1e-9;

/// 将向量逆时针旋转90度
pub fn rotate90(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}
