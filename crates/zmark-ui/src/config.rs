//! 引擎配置
//!
//! 所有容差都是像素值，作为可调整的默认值存在。

use serde::{Deserialize, Serialize};
use zmark_core::geometry::ArrowHeadStyle;
use zmark_core::properties::Stroke;
use zmark_core::shape::HitTolerance;

/// 标注引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 擦除与便签点击的命中容差
    pub hit: HitTolerance,
    /// 测距尺闭合容差：点击点距首顶点不超过该值时闭合（像素）
    pub ruler_close_px: f64,
    /// 测距尺顶点拖拽的抓取半径（像素）
    pub ruler_vertex_grab_px: f64,
    /// 箭头头部尺寸
    pub arrow_head: ArrowHeadStyle,
    /// 新图形的默认描边
    pub default_stroke: Stroke,
    /// 短于该值的拖拽在松开时丢弃；测距尺顶点也要移动超过该值才开始拖拽（像素）
    pub min_drag_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit: HitTolerance::default(),
            ruler_close_px: 10.0,
            ruler_vertex_grab_px: 10.0,
            arrow_head: ArrowHeadStyle::default(),
            default_stroke: Stroke::default(),
            min_drag_px: 2.0,
        }
    }
}
