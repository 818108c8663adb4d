//! 绘制圆 Action
//!
//! 按下点为圆心，拖动距离决定半径。半径按测地距离（米）存储，
//! 缩放地图后圆在地面上的大小不变。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use zmark_core::projection::Projection;
use zmark_core::shape::{Circle, Shape};

/// 圆绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待圆心
    Armed,
    /// 拖动半径
    Dragging,
}

/// 绘制圆 Action
pub struct DrawCircleAction {
    status: Status,
    transient: Option<Shape>,
}

impl DrawCircleAction {
    pub fn new() -> Self {
        Self {
            status: Status::Armed,
            transient: None,
        }
    }
}

impl Default for DrawCircleAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawCircleAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Circle
    }

    fn reset(&mut self) {
        self.status = Status::Armed;
        self.transient = None;
    }

    fn on_press(&mut self, ctx: &ActionContext) -> ActionResult {
        self.transient = Some(Shape::Circle(Circle {
            center: ctx.geo(),
            radius_m: 0.0,
            stroke: ctx.stroke,
        }));
        self.status = Status::Dragging;
        ActionResult::Continue
    }

    fn on_move(&mut self, ctx: &ActionContext) -> ActionResult {
        if self.status == Status::Dragging {
            if let Some(Shape::Circle(circle)) = self.transient.as_mut() {
                circle.radius_m = ctx.projection.geodesic_distance(circle.center, ctx.geo());
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
            Some(Shape::Circle(circle))
                if ctx.pixel_distance(circle.center, ctx.geo()) >= ctx.config.min_drag_px =>
            {
                ActionResult::Commit(Shape::Circle(circle))
            }
            _ => ActionResult::Discard,
        }
    }

    fn transient(&self) -> Option<&Shape> {
        self.transient.as_ref()
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Armed => "指定圆心:",
            Status::Dragging => "拖动指定半径:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::Fixture;
    use zmark_core::math::Point2;

    #[test]
    fn test_circle_radius_is_geodesic() {
        let fx = Fixture::new();
        let mut action = DrawCircleAction::new();

        action.on_press(&fx.ctx(400.0, 300.0));
        match action.on_release(&fx.ctx(450.0, 300.0)) {
            ActionResult::Commit(Shape::Circle(circle)) => {
                let edge = fx.proj.to_geo(Point2::new(450.0, 300.0));
                let expected = circle.center.distance_to(&edge);
                assert!((circle.radius_m - expected).abs() < 1e-6);
                assert!(circle.radius_m > 0.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_tiny_circle_is_discarded() {
        let fx = Fixture::new();
        let mut action = DrawCircleAction::new();

        action.on_press(&fx.ctx(400.0, 300.0));
        assert!(matches!(action.on_release(&fx.ctx(400.5, 300.0)), ActionResult::Discard));
    }
}
