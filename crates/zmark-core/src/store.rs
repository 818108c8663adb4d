//! 图形存储
//!
//! 有序的已提交图形集合。只追加，除了 `pop`（撤销最后一个）、`clear`
//! 和按标识删除（擦除）。箭头的两部分作为一个条目存储。

use crate::math::Point2;
use crate::projection::Projection;
use crate::shape::{HitTolerance, Note, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 图形标识（存储内单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u64);

impl ShapeId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 存储条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredShape {
    pub id: ShapeId,
    pub shape: Shape,
}

/// 图形存储
#[derive(Debug, Default)]
pub struct ShapeStore {
    entries: Vec<StoredShape>,
    next_id: u64,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加图形，返回其标识
    pub fn commit(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        tracing::debug!("Committed {} {}", shape.kind().name(), id);
        self.entries.push(StoredShape { id, shape });
        id
    }

    /// 移除最后提交的图形
    pub fn pop(&mut self) -> Option<StoredShape> {
        self.entries.pop()
    }

    /// 清空存储，返回被移除的条目数
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// 按标识删除
    pub fn remove(&mut self, id: ShapeId) -> Option<StoredShape> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.shape)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// 取得便签的可变引用（仅便签允许在提交后修改）
    pub fn note_mut(&mut self, id: ShapeId) -> Option<&mut Note> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| e.shape.as_note_mut())
    }

    pub fn note(&self, id: ShapeId) -> Option<&Note> {
        self.get(id).and_then(Shape::as_note)
    }

    pub fn last(&self) -> Option<&StoredShape> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按提交顺序（最早的在前）
    pub fn entries(&self) -> &[StoredShape] {
        &self.entries
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StoredShape> {
        self.entries.iter()
    }

    /// 从最近提交的开始查找第一个命中的图形
    pub fn hit_test(&self, p: Point2, proj: &dyn Projection, tol: &HitTolerance) -> Option<ShapeId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.shape.hit_test(p, proj, tol))
            .map(|e| e.id)
    }

    /// 当前图形的只读副本（供截图导出等外部模块使用）
    pub fn snapshot(&self) -> Vec<Shape> {
        self.entries.iter().map(|e| e.shape.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Vertex;
    use crate::projection::WebMercator;
    use crate::properties::Stroke;
    use crate::shape::{Line, Note};

    fn line(proj: &WebMercator, y: f64) -> Shape {
        Shape::Line(Line {
            a: proj.to_geo(Point2::new(100.0, y)),
            b: proj.to_geo(Point2::new(300.0, y)),
            stroke: Stroke::default(),
        })
    }

    #[test]
    fn test_commit_pop_clear() {
        let mut store = ShapeStore::new();
        let a = store.commit(Shape::Note(Note::new(Vertex::new(0.0, 0.0))));
        let b = store.commit(Shape::Note(Note::new(Vertex::new(1.0, 1.0))));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        assert_eq!(store.pop().map(|e| e.id), Some(b));
        assert_eq!(store.len(), 1);

        assert_eq!(store.clear(), 1);
        assert!(store.is_empty());
        assert!(store.pop().is_none());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = ShapeStore::new();
        let a = store.commit(Shape::Note(Note::new(Vertex::new(0.0, 0.0))));
        store.pop();
        let b = store.commit(Shape::Note(Note::new(Vertex::new(0.0, 0.0))));
        assert!(b > a);
    }

    #[test]
    fn test_hit_test_prefers_most_recent() {
        let proj = WebMercator::centered_on(Vertex::new(0.0, 0.0), 14.0, (800.0, 600.0));
        let mut store = ShapeStore::new();
        let _older = store.commit(line(&proj, 100.0));
        let newer = store.commit(line(&proj, 102.0));

        let hit = store.hit_test(Point2::new(200.0, 101.0), &proj, &HitTolerance::default());
        assert_eq!(hit, Some(newer));
        assert!(store
            .hit_test(Point2::new(200.0, 200.0), &proj, &HitTolerance::default())
            .is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = ShapeStore::new();
        let id = store.commit(Shape::Note(Note::new(Vertex::new(0.0, 0.0))));
        let snapshot = store.snapshot();
        store.remove(id);
        assert_eq!(snapshot.len(), 1);
        assert!(store.is_empty());
    }
}
