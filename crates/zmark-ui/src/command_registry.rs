//! 命令注册表
//!
//! 工具、测距尺和编辑命令可以用完整命令名、短名或用户别名触发，大小写不敏感。
//! 每个命令的第一个短名同时是它的键盘快捷键。

use crate::action::ToolMode;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// 可通过命令名触发的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// 切换工具模式
    Tool(ToolMode),
    /// 启用测距尺
    Ruler,
    /// 撤销
    Undo,
    /// 清空所有图形
    Clear,
}

/// 内置命令表：(命令, 完整命令名, 短名)
const COMMANDS: &[(Command, &str, &[&str])] = &[
    (Command::Tool(ToolMode::Idle), "IDLE", &["ESC", "SEL", "NONE"]),
    (Command::Tool(ToolMode::Pen), "PEN", &["P", "DRAW", "FREEHAND"]),
    (Command::Tool(ToolMode::Line), "LINE", &["L"]),
    (Command::Tool(ToolMode::Arrow), "ARROW", &["A", "AR"]),
    (Command::Tool(ToolMode::Rect), "RECTANGLE", &["R", "REC", "RECT"]),
    (Command::Tool(ToolMode::Circle), "CIRCLE", &["C"]),
    (Command::Tool(ToolMode::Erase), "ERASE", &["E", "DELETE"]),
    (Command::Tool(ToolMode::Note), "NOTE", &["N", "TEXT"]),
    (Command::Ruler, "RULER", &["RU", "MEASURE"]),
    (Command::Undo, "UNDO", &["U"]),
    (Command::Clear, "CLEAR", &["CLR"]),
];

impl Command {
    /// 键盘快捷键
    pub fn shortcut(&self) -> Option<&'static str> {
        COMMANDS
            .iter()
            .find(|(command, _, _)| command == self)
            .and_then(|(_, _, shorts)| shorts.first().copied())
    }
}

/// 别名错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("alias {0:?} shadows a built-in command")]
    Reserved(String),

    #[error("alias target {0:?} is not a command")]
    UnknownTarget(String),
}

/// 命令注册表
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    /// 完整命令名与短名 -> Command
    builtins: HashMap<String, Command>,
    /// 用户别名 -> Command
    aliases: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let builtins = COMMANDS
            .iter()
            .flat_map(|&(command, name, shorts)| {
                std::iter::once(name)
                    .chain(shorts.iter().copied())
                    .map(move |n| (n.to_string(), command))
            })
            .collect();

        Self {
            builtins,
            aliases: HashMap::new(),
        }
    }

    /// 查找命令：内置名称优先于别名
    pub fn lookup(&self, input: &str) -> Option<Command> {
        let key = input.trim().to_uppercase();
        self.builtins.get(&key).or_else(|| self.aliases.get(&key)).copied()
    }

    /// Tab 补全
    ///
    /// 返回以 prefix 开头的完整命令名和用户别名（不含短名），已排序
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_uppercase();
        let mut results: Vec<String> = COMMANDS
            .iter()
            .map(|(_, name, _)| *name)
            .chain(self.aliases.keys().map(String::as_str))
            .filter(|name| name.starts_with(&prefix))
            .map(str::to_string)
            .collect();

        results.sort();
        results
    }

    /// 添加用户别名
    ///
    /// 目标可以是命令名、短名或已有别名；别名不能覆盖内置名称。
    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<Command, AliasError> {
        let alias = alias.trim().to_uppercase();
        if self.builtins.contains_key(&alias) {
            return Err(AliasError::Reserved(alias));
        }

        let command = self
            .lookup(target)
            .ok_or_else(|| AliasError::UnknownTarget(target.trim().to_string()))?;
        self.aliases.insert(alias, command);
        Ok(command)
    }

    /// 解析别名文本，返回添加的别名数
    ///
    /// 格式：每行 "alias command"，以 # 开头的行是注释。无效行记录警告后跳过。
    pub fn parse_aliases(&mut self, content: &str) -> usize {
        let mut added = 0;
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(alias), Some(target)) = (parts.next(), parts.next()) else {
                tracing::warn!("Alias line {}: expected \"alias command\", got {:?}", number + 1, line);
                continue;
            };
            match self.add_alias(alias, target) {
                Ok(_) => added += 1,
                Err(e) => tracing::warn!("Alias line {}: {}", number + 1, e),
            }
        }
        added
    }

    /// 从文件加载别名
    pub fn load_aliases(&mut self, path: &Path) -> std::io::Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let added = self.parse_aliases(&content);
        tracing::debug!("Loaded {} command aliases from {}", added, path.display());
        Ok(added)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = CommandRegistry::new();

        assert_eq!(registry.lookup("LINE"), Some(Command::Tool(ToolMode::Line)));
        assert_eq!(registry.lookup("line"), Some(Command::Tool(ToolMode::Line)));
        assert_eq!(registry.lookup("ar"), Some(Command::Tool(ToolMode::Arrow)));
        assert_eq!(registry.lookup(" R "), Some(Command::Tool(ToolMode::Rect)));
        assert_eq!(registry.lookup("esc"), Some(Command::Tool(ToolMode::Idle)));
        assert_eq!(registry.lookup("ruler"), Some(Command::Ruler));

        assert_eq!(registry.lookup("NOTEXIST"), None);
    }

    #[test]
    fn test_every_command_has_unique_shortcut() {
        let registry = CommandRegistry::new();
        let commands: Vec<Command> = ToolMode::ALL
            .into_iter()
            .map(Command::Tool)
            .chain([Command::Ruler, Command::Undo, Command::Clear])
            .collect();

        let mut shortcuts = Vec::new();
        for command in &commands {
            let key = command.shortcut().unwrap_or_else(|| panic!("{command:?} has no shortcut"));
            assert_eq!(registry.lookup(key), Some(*command));
            shortcuts.push(key);
        }
        shortcuts.sort();
        shortcuts.dedup();
        assert_eq!(shortcuts.len(), commands.len());
    }

    #[test]
    fn test_complete_covers_aliases() {
        let mut registry = CommandRegistry::new();
        assert_eq!(registry.complete("c"), vec!["CIRCLE".to_string(), "CLEAR".to_string()]);

        registry.add_alias("cc", "circle").unwrap();
        assert_eq!(registry.complete("c"), vec!["CC", "CIRCLE", "CLEAR"]);
        // 短名不参与补全
        assert!(registry.complete("rec").iter().all(|s| s == "RECTANGLE"));
    }

    #[test]
    fn test_alias() {
        let mut registry = CommandRegistry::new();

        assert_eq!(registry.add_alias("LL", "l"), Ok(Command::Tool(ToolMode::Line)));
        assert_eq!(registry.lookup("ll"), Some(Command::Tool(ToolMode::Line)));

        // 别名可以指向已有别名
        assert_eq!(registry.add_alias("LLL", "LL"), Ok(Command::Tool(ToolMode::Line)));

        assert_eq!(registry.add_alias("c", "LINE"), Err(AliasError::Reserved("C".to_string())));
        assert_eq!(
            registry.add_alias("ZZ", "hexagon"),
            Err(AliasError::UnknownTarget("hexagon".to_string()))
        );
        assert_eq!(registry.lookup("C"), Some(Command::Tool(ToolMode::Circle)));
        assert_eq!(registry.lookup("ZZ"), None);
    }

    #[test]
    fn test_parse_aliases() {
        let mut registry = CommandRegistry::new();
        let added = registry.parse_aliases("# comment\n\nsq\trectangle\nm ruler\nbroken\nl circle\n");

        assert_eq!(added, 2);
        assert_eq!(registry.lookup("SQ"), Some(Command::Tool(ToolMode::Rect)));
        assert_eq!(registry.lookup("m"), Some(Command::Ruler));
        assert_eq!(registry.lookup("broken"), None);
        assert_eq!(registry.lookup("l"), Some(Command::Tool(ToolMode::Line)));
    }

    #[test]
    fn test_load_aliases_from_file() {
        let path = std::env::temp_dir().join("zmark_aliases_test.txt");
        std::fs::write(&path, "sq rectangle\n").expect("Failed to write");

        let mut registry = CommandRegistry::new();
        assert_eq!(registry.load_aliases(&path).expect("Failed to load"), 1);
        assert_eq!(registry.lookup("sq"), Some(Command::Tool(ToolMode::Rect)));

        std::fs::remove_file(&path).ok();
        assert!(registry.load_aliases(&path).is_err());
    }
}
