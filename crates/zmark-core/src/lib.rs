//! ZMark 核心：地图标注与测量的几何引擎
//!
//! 提供地理坐标、投影适配接口、几何内核、标注图形模型和图形存储。
//!
//! # 架构设计
//!
//! - `Vertex`: 地理坐标，是所有图形的规范数据
//! - `Projection`: 由底图提供的投影，几何测试前把顶点换算到屏幕像素
//! - `Shape`: 标注图形的标签联合体，命中测试按类型穷举匹配
//! - `ShapeStore`: 已提交图形的有序集合
//!
//! # 示例
//!
//! ```rust
//! use zmark_core::prelude::*;
//!
//! let ring = [
//!     Vertex::new(0.0, 0.0),
//!     Vertex::new(0.0, 0.01),
//!     Vertex::new(0.01, 0.01),
//! ];
//! println!("Length: {} m", geodesic_length(&ring));
//! println!("Area: {} m²", geodesic_area(&ring));
//! ```

pub mod geodesy;
pub mod geometry;
pub mod math;
pub mod projection;
pub mod properties;
pub mod rich_text;
pub mod shape;
pub mod store;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::geodesy::{CoordinateParseError, Vertex};
    pub use crate::geometry::{
        build_arrow_head, circle_contains, distance_point_to_segment, geodesic_area,
        geodesic_length, point_in_polygon, ArrowHead, ArrowHeadStyle,
    };
    pub use crate::math::{Point2, Vector2};
    pub use crate::projection::{Projection, WebMercator};
    pub use crate::properties::{Color, Stroke};
    pub use crate::rich_text::{RichText, Selection, SpanStyle, StyleSpan};
    pub use crate::shape::{
        Arrow, Circle, Freehand, HitTolerance, Line, Note, Rectangle, Shape, ShapeKind,
    };
    pub use crate::store::{ShapeId, ShapeStore, StoredShape};
}
