//! 擦除 Action
//!
//! 单击时从最近提交的图形开始做命中测试，只删除第一个命中的图形。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};

/// 擦除 Action
pub struct EraseAction;

impl EraseAction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EraseAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for EraseAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Erase
    }

    fn reset(&mut self) {}

    fn on_click(&mut self, ctx: &ActionContext) -> ActionResult {
        match ctx.shapes.hit_test(ctx.pointer, ctx.projection, &ctx.config.hit) {
            Some(id) => ActionResult::Erase(id),
            None => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        "点击要删除的图形:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::Fixture;
    use zmark_core::math::Point2;
    use zmark_core::projection::{Projection, WebMercator};
    use zmark_core::shape::{Line, Shape};

    fn line(y: f64, proj: &WebMercator) -> Shape {
        Shape::Line(Line {
            a: proj.to_geo(Point2::new(100.0, y)),
            b: proj.to_geo(Point2::new(300.0, y)),
            stroke: Default::default(),
        })
    }

    #[test]
    fn test_erase_reports_topmost_hit() {
        let mut fx = Fixture::new();
        let shape_a = line(200.0, &fx.proj);
        let shape_b = line(202.0, &fx.proj);
        fx.shapes.commit(shape_a);
        let top = fx.shapes.commit(shape_b);

        let mut action = EraseAction::new();
        match action.on_click(&fx.ctx(200.0, 201.0)) {
            ActionResult::Erase(id) => assert_eq!(id, top),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(action.on_click(&fx.ctx(200.0, 400.0)), ActionResult::Continue));
    }

    #[test]
    fn test_construction_gesture_is_ignored() {
        let fx = Fixture::new();
        let mut action = EraseAction::new();
        assert!(matches!(action.on_press(&fx.ctx(0.0, 0.0)), ActionResult::Continue));
        assert!(matches!(action.on_release(&fx.ctx(50.0, 50.0)), ActionResult::Continue));
        assert!(action.transient().is_none());
    }
}
