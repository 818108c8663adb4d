//! 标注引擎
//!
//! 持有全部可变状态（工具模式、当前 action、图形存储、测距尺、便签会话），
//! 每个地图实例一个。所有指针事件都带着当前投影进入，引擎不缓存像素位置。

use crate::action::{Action, ActionContext, ActionResult, ToolMode};
use crate::actions::create_action;
use crate::config::EngineConfig;
use crate::note_editor::{MemoryWidget, NoteEditor, TextWidget};
use crate::ruler::{Ruler, RulerClick, RulerState, RulerStats};
use zmark_core::geodesy::Vertex;
use zmark_core::math::Point2;
use zmark_core::projection::Projection;
use zmark_core::properties::Stroke;
use zmark_core::rich_text::{Selection, SpanStyle, StyleSpan};
use zmark_core::shape::{Note, Shape};
use zmark_core::store::{ShapeId, ShapeStore, StoredShape};

/// 指针事件处理后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// 无可见变化（或仅更新了临时图形）
    None,
    /// 提交了新图形
    Committed(ShapeId),
    /// 临时图形未达到最小尺寸被丢弃
    Discarded,
    /// 擦除了图形
    Erased(ShapeId),
    /// 创建了便签并打开会话
    NoteCreated(ShapeId),
    /// 关闭了便签会话
    SessionClosed(ShapeId),
    /// 测距尺单击
    Ruler(RulerClick),
    /// 抓取了测距尺顶点
    VertexGrabbed(usize),
}

/// 撤销的结果
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// 丢弃了正在构造的临时图形
    DiscardedTransient,
    /// 移除了最后提交的图形
    Removed(StoredShape),
    /// 没有可撤销的内容
    Nothing,
}

/// 供渲染器使用的只读视图
#[derive(Debug)]
pub struct Frame<'a> {
    pub mode: ToolMode,
    pub shapes: &'a [StoredShape],
    pub transient: Option<&'a Shape>,
    /// 测距尺未启用时为 `None`
    pub ruler: Option<&'a RulerState>,
    pub ruler_stats: RulerStats,
    pub session: Option<ShapeId>,
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Copy)]
enum Pointer {
    Down,
    Move,
    Up,
    Click,
}

/// 标注引擎
pub struct AnnotationEngine {
    config: EngineConfig,
    store: ShapeStore,
    mode: ToolMode,
    action: Box<dyn Action>,
    stroke: Stroke,
    ruler: Ruler,
    editor: NoteEditor,
}

impl AnnotationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_widget(config, Box::new(MemoryWidget::new()))
    }

    /// 使用指定的文本控件创建引擎
    pub fn with_widget(config: EngineConfig, widget: Box<dyn TextWidget>) -> Self {
        let ruler = Ruler::new(config.ruler_close_px, config.ruler_vertex_grab_px, config.min_drag_px);
        Self {
            stroke: config.default_stroke,
            config,
            store: ShapeStore::new(),
            mode: ToolMode::Idle,
            action: create_action(ToolMode::Idle),
            ruler,
            editor: NoteEditor::new(widget),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn stroke(&self) -> Stroke {
        self.stroke
    }

    /// 设置之后新建图形的描边
    pub fn set_stroke(&mut self, stroke: Stroke) {
        self.stroke = stroke;
    }

    /// 当前临时图形
    pub fn transient(&self) -> Option<&Shape> {
        self.action.transient()
    }

    pub fn prompt(&self) -> &str {
        self.action.get_prompt()
    }

    // ========== 工具模式 ==========

    /// 切换工具模式
    ///
    /// 丢弃临时图形并关闭便签会话；选择非空闲工具会停用测距尺。
    pub fn set_mode(&mut self, mode: ToolMode) {
        if mode != ToolMode::Idle {
            self.ruler.disable();
        }
        self.action.reset();
        self.editor.close();

        if mode != self.mode {
            tracing::info!("Tool mode: {} -> {}", self.mode.name(), mode.name());
            self.action = create_action(mode);
            self.mode = mode;
        }
    }

    // ========== 指针事件 ==========

    pub fn pointer_down(&mut self, proj: &dyn Projection, p: Point2) -> EngineEvent {
        if self.ruler.is_active() {
            return match self.ruler.press(proj, p) {
                Some(index) => EngineEvent::VertexGrabbed(index),
                None => EngineEvent::None,
            };
        }
        self.dispatch(proj, p, Pointer::Down)
    }

    pub fn pointer_move(&mut self, proj: &dyn Projection, p: Point2) -> EngineEvent {
        if self.ruler.is_active() {
            self.ruler.drag_to(proj, p);
            return EngineEvent::None;
        }
        self.dispatch(proj, p, Pointer::Move)
    }

    pub fn pointer_up(&mut self, proj: &dyn Projection, p: Point2) -> EngineEvent {
        if self.ruler.is_active() {
            self.ruler.drag_to(proj, p);
            self.ruler.release();
            return EngineEvent::None;
        }
        self.dispatch(proj, p, Pointer::Up)
    }

    /// 单击
    ///
    /// 点击打开的便签之外的位置会先关闭会话；便签模式下这次点击只用于退出会话。
    pub fn click(&mut self, proj: &dyn Projection, p: Point2) -> EngineEvent {
        if let Some(id) = self.editor.session_note() {
            let inside = self.store.note(id).is_some_and(|note| {
                proj.pixel_distance(proj.to_screen(note.anchor), p) <= self.config.hit.note_radius_px
            });
            if !inside {
                self.editor.close();
                if self.mode == ToolMode::Note {
                    return EngineEvent::SessionClosed(id);
                }
            } else if self.mode == ToolMode::Note {
                return EngineEvent::None;
            }
        }

        if self.ruler.is_active() {
            return EngineEvent::Ruler(self.ruler.click(proj, p));
        }
        self.dispatch(proj, p, Pointer::Click)
    }

    fn dispatch(&mut self, proj: &dyn Projection, p: Point2, pointer: Pointer) -> EngineEvent {
        let ctx = ActionContext {
            pointer: p,
            projection: proj,
            shapes: &self.store,
            config: &self.config,
            stroke: self.stroke,
        };
        let result = match pointer {
            Pointer::Down => self.action.on_press(&ctx),
            Pointer::Move => self.action.on_move(&ctx),
            Pointer::Up => self.action.on_release(&ctx),
            Pointer::Click => self.action.on_click(&ctx),
        };
        self.apply(result)
    }

    fn apply(&mut self, result: ActionResult) -> EngineEvent {
        match result {
            ActionResult::Continue => EngineEvent::None,
            ActionResult::Commit(shape) => EngineEvent::Committed(self.commit(shape)),
            ActionResult::Discard => {
                tracing::debug!("{} gesture discarded", self.action.name());
                EngineEvent::Discarded
            }
            ActionResult::Erase(id) => match self.erase(id) {
                Some(_) => EngineEvent::Erased(id),
                None => EngineEvent::None,
            },
            ActionResult::PlaceNote(anchor) => EngineEvent::NoteCreated(self.create_note_at(anchor)),
        }
    }

    // ========== 图形存储 ==========

    /// 直接提交图形
    pub fn commit(&mut self, shape: Shape) -> ShapeId {
        let kind = shape.kind();
        let id = self.store.commit(shape);
        tracing::info!("Committed {} {} ({} shapes)", kind.name(), id, self.store.len());
        id
    }

    /// 撤销：优先丢弃临时图形，否则移除最后提交的图形
    pub fn undo(&mut self) -> UndoOutcome {
        if self.action.transient().is_some() {
            self.action.reset();
            tracing::info!("Undo: discarded transient {}", self.mode.name());
            return UndoOutcome::DiscardedTransient;
        }

        match self.store.pop() {
            Some(entry) => {
                self.editor.note_removed(entry.id);
                tracing::info!("Undo: removed {} {}", entry.shape.kind().name(), entry.id);
                UndoOutcome::Removed(entry)
            }
            None => UndoOutcome::Nothing,
        }
    }

    /// 清空所有图形，丢弃临时图形并关闭会话
    pub fn clear(&mut self) -> usize {
        self.action.reset();
        self.editor.close();
        let count = self.store.clear();
        tracing::info!("Cleared {} shapes", count);
        count
    }

    /// 擦除屏幕点 `p` 处最上层的图形（最多一个）
    pub fn erase_at(&mut self, proj: &dyn Projection, p: Point2) -> Option<ShapeId> {
        let id = self.store.hit_test(p, proj, &self.config.hit)?;
        self.erase(id).map(|entry| entry.id)
    }

    fn erase(&mut self, id: ShapeId) -> Option<StoredShape> {
        let entry = self.store.remove(id)?;
        self.editor.note_removed(id);
        tracing::info!("Erased {} {}", entry.shape.kind().name(), id);
        Some(entry)
    }

    // ========== 便签 ==========

    /// 在 `anchor` 处创建空白便签并打开编辑会话
    pub fn create_note_at(&mut self, anchor: Vertex) -> ShapeId {
        self.editor.close();
        let id = self.commit(Shape::Note(Note::new(anchor)));
        self.editor.open(&self.store, id);
        id
    }

    /// 打开已有便签的编辑会话
    pub fn open_session(&mut self, id: ShapeId) -> bool {
        self.editor.open(&self.store, id)
    }

    /// 确认并关闭会话（幂等）
    pub fn close_session(&mut self) -> Option<ShapeId> {
        self.editor.close()
    }

    pub fn session_note(&self) -> Option<ShapeId> {
        self.editor.session_note()
    }

    pub fn editor(&self) -> &NoteEditor {
        &self.editor
    }

    pub fn widget_mut(&mut self) -> &mut dyn TextWidget {
        self.editor.widget_mut()
    }

    pub fn selection_changed(&mut self) {
        self.editor.selection_changed();
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        self.editor.insert_text(&mut self.store, text)
    }

    pub fn delete_backward(&mut self) -> bool {
        self.editor.delete_backward(&mut self.store)
    }

    pub fn apply_span_style(&mut self, style: &SpanStyle) -> Option<StyleSpan> {
        self.editor.apply_span_style(&mut self.store, style)
    }

    pub fn set_note_title(&mut self, title: &str) -> bool {
        self.editor.set_title(&mut self.store, title)
    }

    pub fn set_note_image_url(&mut self, url: &str) -> bool {
        self.editor.set_image_url(&mut self.store, url)
    }

    // ========== 测距尺 ==========

    /// 启用测距尺（切换到空闲模式）
    pub fn enable_ruler(&mut self) {
        self.set_mode(ToolMode::Idle);
        self.ruler.enable();
    }

    pub fn disable_ruler(&mut self) {
        self.ruler.disable();
    }

    pub fn clear_ruler(&mut self) {
        self.ruler.clear();
    }

    pub fn finish_ruler(&mut self) -> bool {
        self.ruler.finish()
    }

    pub fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    // ========== 渲染 ==========

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            mode: self.mode,
            shapes: self.store.entries(),
            transient: self.action.transient(),
            ruler: self.ruler.is_active().then(|| self.ruler.state()),
            ruler_stats: self.ruler.stats(),
            session: self.editor.session_note(),
            prompt: self.action.get_prompt(),
        }
    }
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
