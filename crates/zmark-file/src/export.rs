//! 导出：图形存储 -> 通用交换格式
//!
//! 单向导出，没有对应的导入。
//! - 手绘、直线、箭杆 -> LineString
//! - 矩形、箭头头部 -> Polygon（环首尾重复）
//! - 圆 -> Point + `radius_m`
//! - 便签 -> Point + 文本与样式区间

use crate::error::FileError;
use crate::interchange::{position, ExportMetadata, Feature, FeatureCollection, Geometry, Part, Properties};
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zmark_core::geodesy::Vertex;
use zmark_core::properties::Stroke;
use zmark_core::shape::Shape;
use zmark_core::store::{ShapeStore, StoredShape};

/// 生成器名称
const GENERATOR: &str = concat!("zmark ", env!("CARGO_PKG_VERSION"));

/// 把整个存储转换为要素集合（按提交顺序）
pub fn to_interchange(store: &ShapeStore) -> FeatureCollection {
    let features = store.iter().flat_map(shape_features).collect();
    FeatureCollection {
        metadata: ExportMetadata {
            generator: GENERATOR.to_string(),
            exported_at: Utc::now(),
            shape_count: store.len(),
        },
        features,
    }
}

/// 单个图形对应的要素（箭头产生两个）
pub fn shape_features(entry: &StoredShape) -> Vec<Feature> {
    let id = entry.id.raw();
    let kind = entry.shape.kind();
    let styled = |stroke: Stroke| {
        let mut props = Properties::new(kind, id);
        props.color = Some(stroke.color.to_hex());
        props.stroke_weight = Some(stroke.weight);
        props
    };

    match &entry.shape {
        Shape::Freehand(f) => vec![Feature {
            geometry: Geometry::LineString(f.points.iter().copied().map(position).collect()),
            properties: styled(f.stroke),
        }],
        Shape::Line(l) => vec![Feature {
            geometry: Geometry::LineString(vec![position(l.a), position(l.b)]),
            properties: styled(l.stroke),
        }],
        Shape::Arrow(a) => {
            let mut shaft = styled(a.stroke);
            shaft.part = Some(Part::Shaft);
            let mut head = styled(a.stroke);
            head.part = Some(Part::Head);
            vec![
                Feature {
                    geometry: Geometry::LineString(a.shaft.iter().copied().map(position).collect()),
                    properties: shaft,
                },
                Feature {
                    geometry: Geometry::Polygon(vec![closed_ring(&a.head)]),
                    properties: head,
                },
            ]
        }
        Shape::Rectangle(r) => vec![Feature {
            geometry: Geometry::Polygon(vec![closed_ring(&r.corners())]),
            properties: styled(r.stroke),
        }],
        Shape::Circle(c) => {
            let mut props = styled(c.stroke);
            props.radius_m = Some(c.radius_m);
            vec![Feature {
                geometry: Geometry::Point(position(c.center)),
                properties: props,
            }]
        }
        Shape::Note(n) => {
            let mut props = Properties::new(kind, id);
            props.note_id = Some(n.id.to_string());
            props.text = Some(n.text.text().to_string());
            props.style_spans = Some(n.text.spans().to_vec());
            props.title = n.title.clone();
            props.image_url = n.image_url.clone();
            props.created_at = Some(n.created_at);
            vec![Feature {
                geometry: Geometry::Point(position(n.anchor)),
                properties: props,
            }]
        }
    }
}

/// 闭合环：末尾重复第一个顶点
fn closed_ring(vertices: &[Vertex]) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = vertices.iter().copied().map(position).collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// 序列化为格式化的 JSON 文本
pub fn to_json_string(store: &ShapeStore) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(&to_interchange(store))?)
}

/// 导出到文件
pub fn save(store: &ShapeStore, path: &Path) -> Result<(), FileError> {
    let collection = to_interchange(store);

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;

    tracing::info!(
        "Exported {} shapes as {} features to {}",
        collection.metadata.shape_count,
        collection.features.len(),
        path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmark_core::rich_text::SpanStyle;
    use zmark_core::shape::{Arrow, Circle, Freehand, Note, Rectangle};

    fn v(lat: f64, lon: f64) -> Vertex {
        Vertex::new(lat, lon)
    }

    #[test]
    fn test_rectangle_ring_has_five_vertices() {
        let mut store = ShapeStore::new();
        store.commit(Shape::Rectangle(Rectangle {
            corner1: v(48.0, 37.0),
            corner2: v(48.1, 37.2),
            stroke: Stroke::default(),
        }));

        let doc = to_interchange(&store);
        assert_eq!(doc.features.len(), 1);
        match &doc.features[0].geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0][0], rings[0][4]);
                assert_eq!(rings[0][0], [37.0, 48.0]);
            }
            other => panic!("unexpected geometry: {other:?}"),
        }
        assert_eq!(doc.features[0].properties.color.as_deref(), Some("#ff3b30"));
    }

    #[test]
    fn test_arrow_exports_two_parts() {
        let mut store = ShapeStore::new();
        let id = store.commit(Shape::Arrow(Arrow {
            shaft: [v(0.0, 0.0), v(0.0, 0.9)],
            head: [v(0.0, 1.0), v(0.1, 0.9), v(-0.1, 0.9)],
            stroke: Stroke::default(),
        }));

        let doc = to_interchange(&store);
        assert_eq!(doc.metadata.shape_count, 1);
        assert_eq!(doc.features.len(), 2);
        assert!(doc.features.iter().all(|f| f.properties.shape_id == id.raw()));
        assert_eq!(doc.features[0].properties.part, Some(Part::Shaft));
        assert_eq!(doc.features[0].geometry.type_name(), "LineString");
        match &doc.features[1].geometry {
            Geometry::Polygon(rings) => assert_eq!(rings[0].len(), 4),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_circle_and_note_are_points() {
        let mut store = ShapeStore::new();
        store.commit(Shape::Circle(Circle {
            center: v(48.0, 37.0),
            radius_m: 1250.0,
            stroke: Stroke::default(),
        }));
        let mut note = Note::new(v(48.5, 37.5));
        note.text = zmark_core::rich_text::RichText::from_plain("Bridge out");
        note.text.apply_style(0..6, &SpanStyle::bold());
        note.title = Some("Crossing".to_string());
        store.commit(Shape::Note(note));

        let doc = to_interchange(&store);
        let circle = &doc.features[0];
        assert_eq!(circle.geometry, Geometry::Point([37.0, 48.0]));
        assert_eq!(circle.properties.radius_m, Some(1250.0));

        let note = &doc.features[1];
        assert_eq!(note.geometry.type_name(), "Point");
        assert_eq!(note.properties.text.as_deref(), Some("Bridge out"));
        assert_eq!(note.properties.style_spans.as_ref().map(Vec::len), Some(1));
        assert_eq!(note.properties.title.as_deref(), Some("Crossing"));
        assert!(note.properties.color.is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut store = ShapeStore::new();
        store.commit(Shape::Freehand(Freehand {
            points: vec![v(1.0, 2.0), v(3.0, 4.0)],
            stroke: Stroke::default(),
        }));

        let json = to_json_string(&store).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"][0][0], 2.0);
        assert_eq!(feature["properties"]["kind"], "freehand");
        assert_eq!(feature["properties"]["stroke_weight"], 3.0);
        assert!(feature["properties"].get("text").is_none());
    }

    #[test]
    fn test_save_to_file() {
        let temp_dir = std::env::temp_dir();
        let file_path = temp_dir.join("zmark_export_test.geojson");

        let mut store = ShapeStore::new();
        store.commit(Shape::Note(Note::new(v(0.0, 0.0))));
        save(&store, &file_path).expect("Failed to save");

        let text = std::fs::read_to_string(&file_path).expect("Failed to read");
        let doc: FeatureCollection = serde_json::from_str(&text).expect("Failed to parse");
        assert_eq!(doc.features.len(), 1);
        assert!(doc.metadata.generator.starts_with("zmark"));

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_empty_store() {
        let doc = to_interchange(&ShapeStore::new());
        assert!(doc.features.is_empty());
        assert_eq!(doc.metadata.shape_count, 0);
    }
}
