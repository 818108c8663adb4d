//! 手势脚本
//!
//! 用 JSON 描述一次标注会话：视图参数 + 按顺序执行的步骤。屏幕坐标均为像素。
//!
//! ```json
//! {
//!   "view": { "center": "48.0, 37.8", "zoom": 13 },
//!   "steps": [
//!     { "command": "arrow" },
//!     { "drag": { "from": [100, 300], "to": [300, 300] } },
//!     { "command": "ruler" },
//!     { "click": [100, 100] },
//!     "finish_ruler"
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};
use zmark_core::geodesy::Vertex;
use zmark_core::math::Point2;
use zmark_core::projection::WebMercator;
use zmark_core::properties::Stroke;
use zmark_core::rich_text::{Selection, SpanStyle};
use zmark_ui::{AnnotationEngine, Command, CommandRegistry, EngineEvent, UndoOutcome};

/// 视图参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct View {
    /// 视口中心，"lat, lon"
    pub center: String,
    pub zoom: f64,
    /// 视口尺寸（像素）
    pub viewport: [f64; 2],
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: "0, 0".to_string(),
            zoom: 12.0,
            viewport: [800.0, 600.0],
        }
    }
}

impl View {
    pub fn projection(&self) -> Result<WebMercator> {
        let center = Vertex::parse(&self.center)
            .with_context(|| format!("invalid view center {:?}", self.center))?;
        Ok(WebMercator::centered_on(
            center,
            self.zoom,
            (self.viewport[0], self.viewport[1]),
        ))
    }
}

/// 拖拽手势
#[derive(Debug, Clone, Deserialize)]
pub struct Drag {
    pub from: [f64; 2],
    pub to: [f64; 2],
    /// 中间插值的移动事件数
    #[serde(default = "default_drag_steps")]
    pub steps: usize,
}

fn default_drag_steps() -> usize {
    4
}

/// 缩放
#[derive(Debug, Clone, Deserialize)]
pub struct Zoom {
    pub level: f64,
    pub anchor: [f64; 2],
}

/// 单个步骤
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// 命令名、快捷键或别名
    Command(String),
    Down([f64; 2]),
    Move([f64; 2]),
    Up([f64; 2]),
    Click([f64; 2]),
    Drag(Drag),
    EraseAt([f64; 2]),
    /// 在地理坐标处创建便签，"lat, lon"
    NoteAt(String),
    Type(String),
    Backspace,
    Select([usize; 2]),
    Style(SpanStyle),
    Title(String),
    ImageUrl(String),
    CloseSession,
    Stroke(Stroke),
    Pan([f64; 2]),
    Zoom(Zoom),
    FinishRuler,
    ClearRuler,
    Undo,
    Clear,
}

/// 完整脚本
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    pub view: View,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse gesture script")
    }
}

fn point(p: [f64; 2]) -> Point2 {
    Point2::new(p[0], p[1])
}

/// 脚本执行器
pub struct Runner<'a> {
    engine: &'a mut AnnotationEngine,
    registry: &'a CommandRegistry,
    proj: WebMercator,
}

impl<'a> Runner<'a> {
    pub fn new(engine: &'a mut AnnotationEngine, registry: &'a CommandRegistry, proj: WebMercator) -> Self {
        Self { engine, registry, proj }
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.step(step)
                .with_context(|| format!("step {} ({:?}) failed", index + 1, step))?;
        }
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        let proj = self.proj;
        let event = match step {
            Step::Command(name) => {
                self.command(name)?;
                EngineEvent::None
            }
            Step::Down(p) => self.engine.pointer_down(&proj, point(*p)),
            Step::Move(p) => self.engine.pointer_move(&proj, point(*p)),
            Step::Up(p) => self.engine.pointer_up(&proj, point(*p)),
            Step::Click(p) => self.engine.click(&proj, point(*p)),
            Step::Drag(drag) => self.drag(drag),
            Step::EraseAt(p) => match self.engine.erase_at(&proj, point(*p)) {
                Some(id) => EngineEvent::Erased(id),
                None => EngineEvent::None,
            },
            Step::NoteAt(text) => {
                let anchor = Vertex::parse(text)
                    .with_context(|| format!("invalid note anchor {text:?}"))?;
                EngineEvent::NoteCreated(self.engine.create_note_at(anchor))
            }
            Step::Type(text) => {
                require_session(self.engine.insert_text(text), "type")?;
                EngineEvent::None
            }
            Step::Backspace => {
                self.engine.delete_backward();
                EngineEvent::None
            }
            Step::Select([anchor, focus]) => {
                self.engine.set_selection(Selection::new(*anchor, *focus));
                EngineEvent::None
            }
            Step::Style(style) => {
                if self.engine.apply_span_style(style).is_none() {
                    warn!("Style step had no effect (no session or empty selection)");
                }
                EngineEvent::None
            }
            Step::Title(title) => {
                require_session(self.engine.set_note_title(title), "title")?;
                EngineEvent::None
            }
            Step::ImageUrl(url) => {
                require_session(self.engine.set_note_image_url(url), "image_url")?;
                EngineEvent::None
            }
            Step::CloseSession => match self.engine.close_session() {
                Some(id) => EngineEvent::SessionClosed(id),
                None => EngineEvent::None,
            },
            Step::Stroke(stroke) => {
                self.engine.set_stroke(*stroke);
                EngineEvent::None
            }
            Step::Pan([dx, dy]) => {
                self.proj.pan(*dx, *dy);
                EngineEvent::None
            }
            Step::Zoom(zoom) => {
                self.proj.zoom_around(zoom.level, point(zoom.anchor));
                EngineEvent::None
            }
            Step::FinishRuler => {
                self.engine.finish_ruler();
                EngineEvent::None
            }
            Step::ClearRuler => {
                self.engine.clear_ruler();
                EngineEvent::None
            }
            Step::Undo => {
                self.undo();
                EngineEvent::None
            }
            Step::Clear => {
                self.engine.clear();
                EngineEvent::None
            }
        };

        if event != EngineEvent::None {
            debug!("{:?} -> {:?}", step, event);
        }
        Ok(())
    }

    fn command(&mut self, name: &str) -> Result<()> {
        let Some(command) = self.registry.lookup(name) else {
            let suggestions = self.registry.complete(name);
            if suggestions.is_empty() {
                bail!("unknown command {name:?}");
            }
            bail!("unknown command {name:?}, did you mean {}?", suggestions.join(" / "));
        };

        match command {
            Command::Tool(mode) => self.engine.set_mode(mode),
            Command::Ruler => self.engine.enable_ruler(),
            Command::Undo => self.undo(),
            Command::Clear => {
                self.engine.clear();
            }
        }
        Ok(())
    }

    fn drag(&mut self, drag: &Drag) -> EngineEvent {
        let proj = self.proj;
        let (from, to) = (point(drag.from), point(drag.to));
        self.engine.pointer_down(&proj, from);
        for i in 1..=drag.steps {
            let t = i as f64 / (drag.steps + 1) as f64;
            self.engine.pointer_move(&proj, from + (to - from) * t);
        }
        self.engine.pointer_up(&proj, to)
    }

    fn undo(&mut self) {
        match self.engine.undo() {
            UndoOutcome::Nothing => warn!("Nothing to undo"),
            outcome => debug!("Undo: {:?}", outcome),
        }
    }
}

fn require_session(applied: bool, what: &str) -> Result<()> {
    if !applied {
        bail!("{what} requires an open note session");
    }
    Ok(())
}

/// 汇总当前状态
pub fn summarize(engine: &AnnotationEngine) {
    let frame = engine.frame();
    info!("{} shapes, mode {}", frame.shapes.len(), frame.mode.name());
    if let Some(ruler) = frame.ruler {
        info!(
            "Ruler: {} vertices{}, distance {}, area {}",
            ruler.vertices.len(),
            if ruler.closed { " (closed)" } else { "" },
            frame.ruler_stats.distance_km_text(),
            frame.ruler_stats.area_km2_text()
        );
    }
}
