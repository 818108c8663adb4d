//! ZMark 文件输出
//!
//! 把标注图形导出为 GeoJSON 风格的要素集合。

pub mod error;
pub mod export;
pub mod interchange;

pub use error::FileError;
pub use export::{save, shape_features, to_interchange, to_json_string};
pub use interchange::{ExportMetadata, Feature, FeatureCollection, Geometry, Part, Properties};
