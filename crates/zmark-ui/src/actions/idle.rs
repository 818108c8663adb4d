//! 空闲 Action：不响应任何手势，地图交互交给底图

use crate::action::{Action, ToolMode};

pub struct IdleAction;

impl IdleAction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdleAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for IdleAction {
    fn mode(&self) -> ToolMode {
        ToolMode::Idle
    }

    fn reset(&mut self) {}

    fn get_prompt(&self) -> &str {
        "选择工具:"
    }
}
