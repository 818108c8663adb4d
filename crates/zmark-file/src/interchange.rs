//! 通用交换格式（GeoJSON 风格的要素集合）
//!
//! 坐标顺序为 `[经度, 纬度]`。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zmark_core::geodesy::Vertex;
use zmark_core::rich_text::StyleSpan;
use zmark_core::shape::ShapeKind;

/// `[lon, lat]`
pub type Position = [f64; 2];

pub fn position(v: Vertex) -> Position {
    [v.lon, v.lat]
}

/// 要素几何
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// 每个环首尾重复
    Polygon(Vec<Vec<Position>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
        }
    }
}

/// 组合图形中的部件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Shaft,
    Head,
}

/// 要素属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// 图形类型
    pub kind: ShapeKind,
    /// 来源图形在存储中的标识，箭头两个部件相同
    pub shape_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    /// 圆的半径（米），使用方需自行展开为多边形
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_spans: Option<Vec<StyleSpan>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Properties {
    pub fn new(kind: ShapeKind, shape_id: u64) -> Self {
        Self {
            kind,
            shape_id,
            part: None,
            color: None,
            stroke_weight: None,
            radius_m: None,
            note_id: None,
            text: None,
            style_spans: None,
            title: None,
            image_url: None,
            created_at: None,
        }
    }
}

/// 单个要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

/// 导出元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub generator: String,
    pub exported_at: DateTime<Utc>,
    /// 来源图形数（箭头计为一个）
    pub shape_count: usize,
}

/// 要素集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub metadata: ExportMetadata,
    pub features: Vec<Feature>,
}
