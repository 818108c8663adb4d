//! 富文本模型
//!
//! 纯文本 + 行内样式区间。区间之间只允许不相交或嵌套，不允许部分重叠；
//! 新区间与旧区间部分重叠时，旧区间会在边界处被拆开。
//!
//! 所有位置都是字符（Unicode 标量）偏移，而不是字节偏移。

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 行内样式（增量）：`None` 表示不改变该属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl SpanStyle {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some(true),
            ..Default::default()
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: Some(true),
            ..Default::default()
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_font_size(mut self, size_px: f64) -> Self {
        self.font_size_px = Some(size_px);
        self
    }

    /// 用 `delta` 中已设置的属性覆盖自身
    pub fn merge(&mut self, delta: &SpanStyle) {
        if let Some(family) = &delta.font_family {
            self.font_family = Some(family.clone());
        }
        if delta.font_size_px.is_some() {
            self.font_size_px = delta.font_size_px;
        }
        if delta.bold.is_some() {
            self.bold = delta.bold;
        }
        if delta.italic.is_some() {
            self.italic = delta.italic;
        }
        if delta.underline.is_some() {
            self.underline = delta.underline;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SpanStyle::default()
    }
}

/// 样式区间 `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub start: usize,
    pub end: usize,
    pub style: SpanStyle,
}

impl StyleSpan {
    pub fn new(start: usize, end: usize, style: SpanStyle) -> Self {
        Self { start, end, style }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// 选区（锚点 + 焦点，允许反向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub focus: usize,
}

impl Selection {
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// 折叠的光标
    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// 规范化后的区间
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.focus)..self.anchor.max(self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// 限制在 `[0, len]` 内
    pub fn clamped(&self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.focus.min(len))
    }
}

/// 富文本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    text: String,
    spans: Vec<StyleSpan>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 按 (起点升序, 终点降序) 排列，外层区间在内层之前
    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    /// 字符数
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// 用 `insert` 替换 `range` 内的文本，返回插入后的光标位置
    ///
    /// 区间随文本移动；被完全删除的区间会被丢弃。插入点位于某区间
    /// 末尾时，新文本继承该区间的样式。
    pub fn replace_range(&mut self, range: Range<usize>, insert: &str) -> usize {
        let len = self.char_len();
        let s = range.start.min(len);
        let e = range.end.clamp(s, len);
        let removed = e - s;
        let inserted = insert.chars().count();

        let (bs, be) = (self.byte_offset(s), self.byte_offset(e));
        self.text.replace_range(bs..be, insert);

        let collapse = |p: usize| {
            if p <= s {
                p
            } else if p >= e {
                p - removed
            } else {
                s
            }
        };

        for span in &mut self.spans {
            let start = collapse(span.start);
            let end = collapse(span.end);

            span.start = if start >= s && end > start { start + inserted } else { start };
            span.end = if end > s || (end == s && start < s) {
                end + inserted
            } else {
                end
            };
            if start >= end {
                // 标记为空，稍后移除
                span.end = span.start;
            }
        }
        self.spans.retain(|span| span.start < span.end);
        self.sort_spans();

        s + inserted
    }

    /// 在 `at` 处插入文本
    pub fn insert(&mut self, at: usize, text: &str) -> usize {
        self.replace_range(at..at, text)
    }

    /// 删除 `range` 内的文本
    pub fn delete(&mut self, range: Range<usize>) {
        self.replace_range(range, "");
    }

    /// 给 `range` 应用样式增量，返回作用于该区间的样式区间
    ///
    /// 空区间不做任何事。与已有区间完全重合时合并到已有区间；
    /// 部分重叠的旧区间在边界处拆开；被新区间包含的旧区间也合并增量，
    /// 保证最近一次设置的属性在整个选区上生效。
    pub fn apply_style(&mut self, range: Range<usize>, delta: &SpanStyle) -> Option<StyleSpan> {
        let len = self.char_len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end || delta.is_empty() {
            return None;
        }

        if let Some(existing) = self
            .spans
            .iter_mut()
            .find(|span| span.start == start && span.end == end)
        {
            existing.style.merge(delta);
            let result = existing.clone();
            self.merge_into_contained(start, end, delta);
            return Some(result);
        }

        self.split_at(start);
        self.split_at(end);
        self.merge_into_contained(start, end, delta);

        let span = StyleSpan::new(start, end, delta.clone());
        self.spans.push(span.clone());
        self.sort_spans();
        Some(span)
    }

    /// 拆开跨越 `pos` 的区间
    fn split_at(&mut self, pos: usize) {
        let mut tails = Vec::new();
        for span in &mut self.spans {
            if span.start < pos && pos < span.end {
                tails.push(StyleSpan::new(pos, span.end, span.style.clone()));
                span.end = pos;
            }
        }
        self.spans.extend(tails);
    }

    fn merge_into_contained(&mut self, start: usize, end: usize, delta: &SpanStyle) {
        for span in &mut self.spans {
            if start <= span.start && span.end <= end && !(span.start == start && span.end == end) {
                span.style.merge(delta);
            }
        }
    }

    fn sort_spans(&mut self) {
        self.spans
            .sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    }

    /// `pos` 处字符的有效样式（外层到内层依次合并）
    pub fn style_at(&self, pos: usize) -> SpanStyle {
        let mut style = SpanStyle::default();
        for span in self.spans.iter().filter(|span| span.contains(pos)) {
            style.merge(&span.style);
        }
        style
    }

    /// 按样式切分的连续片段，供渲染使用
    pub fn runs(&self) -> Vec<(Range<usize>, SpanStyle)> {
        let len = self.char_len();
        let mut cuts: Vec<usize> = vec![0, len];
        for span in &self.spans {
            cuts.push(span.start);
            cuts.push(span.end);
        }
        cuts.sort_unstable();
        cuts.dedup();

        cuts.windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| (w[0]..w[1], self.style_at(w[0])))
            .collect()
    }
}
