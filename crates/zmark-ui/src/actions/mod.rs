//! 具体的 Action 实现
//!
//! 每个标注工具对应一个 Action 实现

mod draw_arrow;
mod draw_circle;
mod draw_line;
mod draw_pen;
mod draw_rectangle;
mod erase;
mod idle;
mod place_note;

pub use draw_arrow::DrawArrowAction;
pub use draw_circle::DrawCircleAction;
pub use draw_line::DrawLineAction;
pub use draw_pen::DrawPenAction;
pub use draw_rectangle::DrawRectangleAction;
pub use erase::EraseAction;
pub use idle::IdleAction;
pub use place_note::PlaceNoteAction;

use crate::action::{Action, ToolMode};

/// 创建指定模式的 Action
pub fn create_action(mode: ToolMode) -> Box<dyn Action> {
    match mode {
        ToolMode::Idle => Box::new(IdleAction::new()),
        ToolMode::Pen => Box::new(DrawPenAction::new()),
        ToolMode::Line => Box::new(DrawLineAction::new()),
        ToolMode::Arrow => Box::new(DrawArrowAction::new()),
        ToolMode::Rect => Box::new(DrawRectangleAction::new()),
        ToolMode::Circle => Box::new(DrawCircleAction::new()),
        ToolMode::Erase => Box::new(EraseAction::new()),
        ToolMode::Note => Box::new(PlaceNoteAction::new()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! 各 action 测试共用的上下文
    use crate::action::ActionContext;
    use crate::config::EngineConfig;
    use zmark_core::geodesy::Vertex;
    use zmark_core::math::Point2;
    use zmark_core::projection::WebMercator;
    use zmark_core::store::ShapeStore;

    pub struct Fixture {
        pub proj: WebMercator,
        pub shapes: ShapeStore,
        pub config: EngineConfig,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                proj: WebMercator::centered_on(Vertex::new(48.0, 37.0), 14.0, (800.0, 600.0)),
                shapes: ShapeStore::new(),
                config: EngineConfig::default(),
            }
        }

        pub fn ctx(&self, x: f64, y: f64) -> ActionContext<'_> {
            ActionContext {
                pointer: Point2::new(x, y),
                projection: &self.proj,
                shapes: &self.shapes,
                config: &self.config,
                stroke: self.config.default_stroke,
            }
        }
    }
}
