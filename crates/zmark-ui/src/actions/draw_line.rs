//! 绘制直线 Action

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use zmark_core::shape::{Line, Shape};

/// 直线绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待按下起点
    Armed,
    /// 拖动终点
    Dragging,
}

/// 绘制直线 Action
pub struct DrawLineAction {
    status: Status,
    transient: Option<Shape>,
}

impl DrawLineAction {
    pub fn new() -> Self {
        Self {
            status: Status::Armed,
            transient: None,
        }
    }
}

impl Default for DrawLineAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawLineAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Line
    }

    fn reset(&mut self) {
        self.status = Status::Armed;
        self.transient = None;
    }

    fn on_press(&mut self, ctx: &ActionContext) -> ActionResult {
        let v = ctx.geo();
        self.transient = Some(Shape::Line(Line {
            a: v,
            b: v,
            stroke: ctx.stroke,
        }));
        self.status = Status::Dragging;
        ActionResult::Continue
    }

    fn on_move(&mut self, ctx: &ActionContext) -> ActionResult {
        if self.status == Status::Dragging {
            if let Some(Shape::Line(line)) = self.transient.as_mut() {
                line.b = ctx.geo();
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

        match self.transient.take() {
            Some(Shape::Line(line)) if ctx.pixel_distance(line.a, line.b) >= ctx.config.min_drag_px => {
                ActionResult::Commit(Shape::Line(line))
            }
            _ => ActionResult::Discard,
        }
    }

    fn transient(&self) -> Option<&Shape> {
        self.transient.as_ref()
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Armed => "指定起点:",
            Status::Dragging => "拖动到终点:",
        }
    }
}
