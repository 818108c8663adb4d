//! 绘制矩形 Action
//!
//! 按下点为第一角点，松开点为对角点。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use zmark_core::projection::Projection;
use zmark_core::shape::{Rectangle, Shape};

/// 矩形绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待第一角点
    Armed,
    /// 拖动对角点
    Dragging,
}

/// 绘制矩形 Action
pub struct DrawRectangleAction {
    status: Status,
    transient: Option<Shape>,
}

impl DrawRectangleAction {
    pub fn new() -> Self {
        Self {
            status: Status::Armed,
            transient: None,
        }
    }
}

impl Default for DrawRectangleAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawRectangleAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Rect
    }

    fn reset(&mut self) {
        self.status = Status::Armed;
        self.transient = None;
    }

    fn on_press(&mut self, ctx: &ActionContext) -> ActionResult {
        let v = ctx.geo();
        self.transient = Some(Shape::Rectangle(Rectangle {
            corner1: v,
            corner2: v,
            stroke: ctx.stroke,
        }));
        self.status = Status::Dragging;
        ActionResult::Continue
    }

    fn on_move(&mut self, ctx: &ActionContext) -> ActionResult {
        if self.status == Status::Dragging {
            if let Some(Shape::Rectangle(rect)) = self.transient.as_mut() {
                rect.corner2 = ctx.geo();
            }
        }
        ActionResult::Continue
    }

    fn on_release(&mut self, ctx: &ActionContext) -> ActionResult {
        if self.status != Status::Dragging {
            return ActionResult::Continue;
        }
        self.on_move(ctx);
        self.status = Status::Armed;

        let Some(Shape::Rectangle(rect)) = self.transient.take() else {
            return ActionResult::Discard;
        };
        // 宽或高退化的矩形丢弃
        let p1 = ctx.projection.to_screen(rect.corner1);
        let p2 = ctx.projection.to_screen(rect.corner2);
        let min = ctx.config.min_drag_px;
        if (p2.x - p1.x).abs() < min || (p2.y - p1.y).abs() < min {
            return ActionResult::Discard;
        }
        ActionResult::Commit(Shape::Rectangle(rect))
    }

    fn transient(&self) -> Option<&Shape> {
        self.transient.as_ref()
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Armed => "指定第一个角点:",
            Status::Dragging => "拖动到另一个角点:",
        }
    }
}
