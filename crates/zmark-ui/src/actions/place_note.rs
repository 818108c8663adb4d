//! 放置便签 Action

use crate::action::{Action, ActionContext, ActionResult, ToolMode};

/// 放置便签 Action
///
/// 只负责报告锚点位置；会话的开关由引擎处理。
pub struct PlaceNoteAction;

impl PlaceNoteAction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaceNoteAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for PlaceNoteAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Note
    }

    fn reset(&mut self) {}

    fn on_click(&mut self, ctx: &ActionContext) -> ActionResult {
        ActionResult::PlaceNote(ctx.geo())
    }

    fn get_prompt(&self) -> &str {
        "点击地图放置便签:"
    }
}
