//! 便签编辑器
//!
//! 全局最多一个编辑会话。会话绑定到存储中的一个便签，文本与样式的修改直接
//! 写入该便签的 [`RichText`]，同时同步到可替换的文本控件 [`TextWidget`]。
//!
//! 工具栏按钮通常会抢走焦点并清空控件选区，所以每次选区变化都会保存快照，
//! 应用样式前先把快照恢复到控件上。

use zmark_core::rich_text::{RichText, Selection, SpanStyle, StyleSpan};
use zmark_core::shape::Note;
use zmark_core::store::{ShapeId, ShapeStore};

/// 文本编辑控件适配器
///
/// 具体的渲染/输入控件实现此 trait；引擎只通过它读写文本和选区。
pub trait TextWidget: Send {
    /// 控件当前显示的纯文本
    fn text(&self) -> String;

    /// 用模型内容替换控件内容
    fn set_text(&mut self, text: &RichText);

    /// 当前选区；控件失去焦点时为 `None`
    fn selection(&self) -> Option<Selection>;

    fn set_selection(&mut self, selection: Option<Selection>);

    /// 在控件上显示一个样式区间
    fn apply_span(&mut self, span: &StyleSpan);

    fn focus(&mut self);

    fn blur(&mut self);

    fn is_focused(&self) -> bool;
}

/// 内存中的文本控件（无界面运行与测试）
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget {
    text: String,
    spans: Vec<StyleSpan>,
    selection: Option<Selection>,
    focused: bool,
}

impl MemoryWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }
}

impl TextWidget for MemoryWidget {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &RichText) {
        self.text = text.text().to_string();
        self.spans = text.spans().to_vec();
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    fn apply_span(&mut self, span: &StyleSpan) {
        self.spans.push(span.clone());
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
        self.selection = None;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

/// 编辑会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSession {
    pub note: ShapeId,
    /// 最近一次非空选区的快照
    pub saved_selection: Option<Selection>,
}

/// 便签编辑器
pub struct NoteEditor {
    session: Option<NoteSession>,
    widget: Box<dyn TextWidget>,
}

impl NoteEditor {
    pub fn new(widget: Box<dyn TextWidget>) -> Self {
        Self {
            session: None,
            widget,
        }
    }

    pub fn session(&self) -> Option<&NoteSession> {
        self.session.as_ref()
    }

    /// 正在编辑的便签
    pub fn session_note(&self) -> Option<ShapeId> {
        self.session.as_ref().map(|s| s.note)
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn widget(&self) -> &dyn TextWidget {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> &mut dyn TextWidget {
        self.widget.as_mut()
    }

    /// 打开 `id` 的编辑会话，先关闭已有会话
    ///
    /// `id` 不是存储中的便签时返回 `false`。
    pub fn open(&mut self, store: &ShapeStore, id: ShapeId) -> bool {
        self.close();
        let Some(note) = store.note(id) else {
            return false;
        };

        let caret = Selection::caret(note.text.char_len());
        self.session = Some(NoteSession {
            note: id,
            saved_selection: Some(caret),
        });
        self.widget.set_text(&note.text);
        self.widget.set_selection(Some(caret));
        self.widget.focus();
        tracing::info!("Note session opened on {}", id);
        true
    }

    /// 关闭会话（幂等）
    pub fn close(&mut self) -> Option<ShapeId> {
        let session = self.session.take()?;
        self.widget.blur();
        tracing::info!("Note session closed on {}", session.note);
        Some(session.note)
    }

    /// 便签已从存储移除：如果正在编辑它则关闭会话
    pub fn note_removed(&mut self, id: ShapeId) -> bool {
        if self.session_note() == Some(id) {
            self.close();
            true
        } else {
            false
        }
    }

    /// 控件选区变化时调用，保存快照
    ///
    /// 控件失去选区（`None`）时保留上一次的快照。
    pub fn selection_changed(&mut self) {
        let Some(selection) = self.widget.selection() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.saved_selection = Some(selection);
        }
    }

    /// 设置控件选区并保存快照
    pub fn set_selection(&mut self, selection: Selection) {
        if self.session.is_none() {
            return;
        }
        self.widget.set_selection(Some(selection));
        self.selection_changed();
    }

    /// 用 `text` 替换当前选区
    pub fn insert_text(&mut self, store: &mut ShapeStore, text: &str) -> bool {
        let selection = self.current_selection();
        let Some(note) = self.live_note(store) else {
            return false;
        };

        let len = note.text.char_len();
        let range = selection.map_or(len..len, |s| s.clamped(len).range());
        let caret = note.text.replace_range(range, text);
        self.widget.set_text(&note.text);
        self.set_selection(Selection::caret(caret));
        true
    }

    /// 退格：删除选区，或删除光标前一个字符
    pub fn delete_backward(&mut self, store: &mut ShapeStore) -> bool {
        let selection = self.current_selection();
        let Some(note) = self.live_note(store) else {
            return false;
        };

        let len = note.text.char_len();
        let selection = selection.unwrap_or(Selection::caret(len)).clamped(len);
        let range = if selection.is_collapsed() {
            let caret = selection.focus;
            if caret == 0 {
                return false;
            }
            caret - 1..caret
        } else {
            selection.range()
        };
        let caret = range.start;
        note.text.delete(range);
        self.widget.set_text(&note.text);
        self.set_selection(Selection::caret(caret));
        true
    }

    /// 给保存的选区应用样式增量
    ///
    /// 没有会话或选区折叠时什么也不做。
    pub fn apply_span_style(
        &mut self,
        store: &mut ShapeStore,
        style: &SpanStyle,
    ) -> Option<StyleSpan> {
        let saved = self.session.as_ref()?.saved_selection;
        let note = self.live_note(store)?;
        let selection = saved?.clamped(note.text.char_len());

        // 恢复被工具栏清掉的选区
        self.widget.set_selection(Some(selection));
        if selection.is_collapsed() {
            return None;
        }

        let span = note.text.apply_style(selection.range(), style)?;
        self.widget.apply_span(&span);
        tracing::debug!("Applied span {}..{} to note", span.start, span.end);
        Some(span)
    }

    /// 修改标题（空字符串清除标题）
    pub fn set_title(&mut self, store: &mut ShapeStore, title: &str) -> bool {
        let Some(note) = self.live_note(store) else {
            return false;
        };
        let title = title.trim();
        note.title = (!title.is_empty()).then(|| title.to_string());
        true
    }

    /// 记录外部上传完成后的图片地址
    pub fn set_image_url(&mut self, store: &mut ShapeStore, url: &str) -> bool {
        let Some(note) = self.live_note(store) else {
            return false;
        };
        note.image_url = Some(url.to_string());
        true
    }

    fn current_selection(&self) -> Option<Selection> {
        self.widget
            .selection()
            .or_else(|| self.session.as_ref().and_then(|s| s.saved_selection))
    }

    /// 会话对应的便签；便签已被删除时强制关闭会话
    fn live_note<'s>(&mut self, store: &'s mut ShapeStore) -> Option<&'s mut Note> {
        let id = self.session_note()?;
        match store.note_mut(id) {
            Some(note) => Some(note),
            None => {
                tracing::warn!("Note {} no longer exists, closing stale session", id);
                self.close();
                None
            }
        }
    }
}

impl Default for NoteEditor {
    fn default() -> Self {
        Self::new(Box::new(MemoryWidget::new()))
    }
}
