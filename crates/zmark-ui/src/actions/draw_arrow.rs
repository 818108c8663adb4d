//! 绘制箭头 Action
//!
//! 拖拽过程中预览为直线，松开时生成头部并把箭杆截断到头部底边。
//! 拖拽长度不超过头部长度时丢弃。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use zmark_core::shape::{Arrow, Line, Shape};

/// 箭头绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Armed,
    Dragging,
}

/// 绘制箭头 Action
pub struct DrawArrowAction {
    status: Status,
    /// 拖拽中的箭杆预览
    transient: Option<Shape>,
}

impl DrawArrowAction {
    pub fn new() -> Self {
        Self {
            status: Status::Armed,
            transient: None,
        }
    }
}

impl Default for DrawArrowAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawArrowAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Arrow
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

        let Some(Shape::Line(line)) = self.transient.take() else {
            return ActionResult::Discard;
        };
        if ctx.pixel_distance(line.a, line.b) < ctx.config.min_drag_px {
            return ActionResult::Discard;
        }
        match Arrow::build(line.a, line.b, line.stroke, &ctx.config.arrow_head, ctx.projection) {
            Some(arrow) => ActionResult::Commit(Shape::Arrow(arrow)),
            None => ActionResult::Discard,
        }
    }

    fn transient(&self) -> Option<&Shape> {
        self.transient.as_ref()
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Armed => "指定箭尾:",
            Status::Dragging => "拖动到箭头尖端:",
        }
    }
}
