//! Action 系统 - 工具模式状态机
//!
//! 每个工具是一个独立的 Action 实现。构造类工具（画笔、直线、箭头、
//! 矩形、圆）响应 按下 → 移动 → 松开 手势，擦除和便签工具只响应单击。

use crate::command_registry::Command;
use crate::config::EngineConfig;
use zmark_core::geodesy::Vertex;
use zmark_core::math::Point2;
use zmark_core::projection::Projection;
use zmark_core::properties::Stroke;
use zmark_core::shape::Shape;
use zmark_core::store::{ShapeId, ShapeStore};

/// Action 执行结果
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// 继续当前 action
    Continue,
    /// 提交临时图形
    Commit(Shape),
    /// 丢弃临时图形（未达到最小尺寸）
    Discard,
    /// 删除命中的图形
    Erase(ShapeId),
    /// 在此处放置便签
    PlaceNote(Vertex),
}

/// 工具模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMode {
    Idle,
    Pen,
    Line,
    Arrow,
    Rect,
    Circle,
    Erase,
    Note,
}

impl ToolMode {
    pub const ALL: [ToolMode; 8] = [
        ToolMode::Idle,
        ToolMode::Pen,
        ToolMode::Line,
        ToolMode::Arrow,
        ToolMode::Rect,
        ToolMode::Circle,
        ToolMode::Erase,
        ToolMode::Note,
    ];

    /// 获取工具名称
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Idle => "Idle",
            ToolMode::Pen => "Pen",
            ToolMode::Line => "Line",
            ToolMode::Arrow => "Arrow",
            ToolMode::Rect => "Rectangle",
            ToolMode::Circle => "Circle",
            ToolMode::Erase => "Erase",
            ToolMode::Note => "Note",
        }
    }

    /// 获取快捷键（由命令注册表提供）
    pub fn shortcut(&self) -> Option<&'static str> {
        Command::Tool(*self).shortcut()
    }

    /// 是否使用 按下-移动-松开 构造手势
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ToolMode::Pen | ToolMode::Line | ToolMode::Arrow | ToolMode::Rect | ToolMode::Circle
        )
    }
}

/// Action 上下文 - 每次事件传入的运行时信息
pub struct ActionContext<'a> {
    /// 指针的屏幕坐标
    pub pointer: Point2,
    /// 当前投影（两次事件之间可能变化）
    pub projection: &'a dyn Projection,
    /// 已提交的图形（用于擦除命中测试）
    pub shapes: &'a ShapeStore,
    pub config: &'a EngineConfig,
    /// 新图形使用的描边
    pub stroke: Stroke,
}

impl ActionContext<'_> {
    /// 指针位置的地理坐标
    pub fn geo(&self) -> Vertex {
        self.projection.to_geo(self.pointer)
    }

    /// 两个地理坐标在当前投影下的像素距离
    pub fn pixel_distance(&self, a: Vertex, b: Vertex) -> f64 {
        self.projection
            .pixel_distance(self.projection.to_screen(a), self.projection.to_screen(b))
    }
}

/// Action trait - 所有工具的核心接口
pub trait Action: Send {
    /// 获取工具模式
    fn mode(&self) -> ToolMode;

    /// 获取 action 名称
    fn name(&self) -> &str {
        self.mode().name()
    }

    /// 重置状态，丢弃临时图形
    fn reset(&mut self);

    // ========== 构造手势 ==========

    /// 指针按下
    fn on_press(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    /// 指针移动
    fn on_move(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    /// 指针松开
    fn on_release(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    // ========== 单击 ==========

    /// 单击（擦除命中测试、便签放置）
    fn on_click(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    // ========== 预览 ==========

    /// 当前临时图形
    fn transient(&self) -> Option<&Shape> {
        None
    }

    /// 获取当前状态的提示文本
    fn get_prompt(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_modes() {
        let construction: Vec<ToolMode> =
            ToolMode::ALL.into_iter().filter(ToolMode::is_construction).collect();
        assert_eq!(
            construction,
            vec![ToolMode::Pen, ToolMode::Line, ToolMode::Arrow, ToolMode::Rect, ToolMode::Circle]
        );
    }

    #[test]
    fn test_tool_shortcuts() {
        assert_eq!(ToolMode::Idle.shortcut(), Some("ESC"));
        assert_eq!(ToolMode::Arrow.shortcut(), Some("A"));
        assert!(ToolMode::ALL.iter().all(|m| m.shortcut().is_some()));
    }
}
