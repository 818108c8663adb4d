//! ZMark 回放程序
//!
//! 读取 JSON 手势脚本，驱动标注引擎，把结果导出为要素集合。
//!
//! ```text
//! zmark <script.json> [-o out.geojson] [--config engine.json] [--aliases aliases.txt] [--verbose]
//! ```

mod script;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use script::{summarize, Runner, Script};
use zmark_ui::{AnnotationEngine, CommandRegistry, EngineConfig};

/// 命令行参数
#[derive(Debug, Default)]
struct Args {
    script: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    aliases: Option<PathBuf>,
    verbose: bool,
}

fn usage() -> String {
    "Usage:\n  zmark <script.json> [-o OUTPUT] [--config FILE] [--aliases FILE] [--verbose]\n\n\
     Without -o the feature collection is printed to stdout."
        .to_string()
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<PathBuf> {
    *i += 1;
    match args.get(*i) {
        Some(v) => Ok(PathBuf::from(v)),
        None => bail!("{flag} requires a path"),
    }
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut script = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => parsed.output = Some(take_value(args, &mut i, "--output")?),
            "--config" => parsed.config = Some(take_value(args, &mut i, "--config")?),
            "--aliases" => parsed.aliases = Some(take_value(args, &mut i, "--aliases")?),
            "-v" | "--verbose" => parsed.verbose = true,
            "-h" | "--help" => bail!(usage()),
            s if s.starts_with('-') => bail!("unknown arg: {s}\n\n{}", usage()),
            s => {
                if script.is_some() {
                    bail!("only one script may be given\n\n{}", usage());
                }
                script = Some(PathBuf::from(s));
            }
        }
        i += 1;
    }

    match script {
        Some(path) => parsed.script = path,
        None => bail!(usage()),
    }
    Ok(parsed)
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!("Loaded engine config from {}", path.display());
    Ok(config)
}

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv)?;

    // 初始化日志
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(level).with_writer(std::io::stderr).finish(),
    )?;

    info!("Starting ZMark replay of {}", args.script.display());

    let config = load_config(args.config.as_ref())?;

    let mut registry = CommandRegistry::new();
    if let Some(path) = &args.aliases {
        registry
            .load_aliases(path)
            .with_context(|| format!("failed to read aliases {}", path.display()))?;
    }

    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script = Script::from_json(&text)?;

    let mut engine = AnnotationEngine::new(config);
    Runner::new(&mut engine, &registry, script.view.projection()?).run(&script.steps)?;
    summarize(&engine);

    match &args.output {
        Some(path) => zmark_file::save(engine.store(), path)?,
        None => println!("{}", zmark_file::to_json_string(engine.store())?),
    }

    Ok(())
}
