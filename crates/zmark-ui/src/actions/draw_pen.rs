//! 手绘 Action
//!
//! 按下开始一条折线，拖拽时逐点追加，松开时提交。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use zmark_core::shape::{Freehand, Shape};

/// 手绘状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待按下
    Armed,
    /// 正在绘制
    Dragging,
}

/// 手绘 Action
pub struct DrawPenAction {
    status: Status,
    /// 临时图形（总是 `Shape::Freehand`）
    transient: Option<Shape>,
}

impl DrawPenAction {
    pub fn new() -> Self {
        Self {
            status: Status::Armed,
            transient: None,
        }
    }

    fn freehand_mut(&mut self) -> Option<&mut Freehand> {
        match self.transient.as_mut() {
            Some(Shape::Freehand(f)) => Some(f),
            _ => None,
        }
    }
}

impl Default for DrawPenAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawPenAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Pen
    }

    fn reset(&mut self) {
        self.status = Status::Armed;
        self.transient = None;
    }

    fn on_press(&mut self, ctx: &ActionContext) -> ActionResult {
        self.transient = Some(Shape::Freehand(Freehand {
            points: vec![ctx.geo()],
            stroke: ctx.stroke,
        }));
        self.status = Status::Dragging;
        ActionResult::Continue
    }

    fn on_move(&mut self, ctx: &ActionContext) -> ActionResult {
        if self.status != Status::Dragging {
            return ActionResult::Continue;
        }
        let v = ctx.geo();
        let Some(freehand) = self.freehand_mut() else {
            return ActionResult::Continue;
        };
        // 同一像素上的重复点不追加
        let duplicate = freehand
            .points
            .last()
            .is_some_and(|last| ctx.pixel_distance(*last, v) < 0.5);
        if !duplicate {
            freehand.points.push(v);
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
            Some(Shape::Freehand(f)) if f.points.len() >= 2 => {
                ActionResult::Commit(Shape::Freehand(f))
            }
            _ => ActionResult::Discard,
        }
    }

    fn transient(&self) -> Option<&Shape> {
        self.transient.as_ref()
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Armed => "按下开始绘制:",
            Status::Dragging => "拖动绘制，松开完成:",
        }
    }
}
