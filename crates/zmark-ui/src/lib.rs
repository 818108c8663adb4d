//! ZMark 交互引擎
//!
//! 把指针手势翻译为标注图形：工具模式状态机、测距尺、便签编辑会话。
//! 引擎本身不绘制任何像素，渲染器通过 [`AnnotationEngine::frame`] 读取状态。

pub mod action;
pub mod actions;
pub mod command_registry;
pub mod config;
pub mod engine;
pub mod note_editor;
pub mod ruler;

pub use action::{Action, ActionContext, ActionResult, ToolMode};
pub use actions::create_action;
pub use command_registry::{AliasError, Command, CommandRegistry};
pub use config::EngineConfig;
pub use engine::{AnnotationEngine, EngineEvent, Frame, UndoOutcome};
pub use note_editor::{MemoryWidget, NoteEditor, NoteSession, TextWidget};
pub use ruler::{Ruler, RulerClick, RulerState, RulerStats};
