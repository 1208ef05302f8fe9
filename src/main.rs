//! cellgrid - headless driver for the grid interaction engine

mod error;
mod keymap;
mod script;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use cellgrid_core::{GridConfig, Sheet, SheetEngine};
use tracing_subscriber::EnvFilter;

use crate::script::ScriptRunner;

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS] [SCRIPT]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [SCRIPT]                  Command script to run (reads stdin when omitted)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <LINE>      Run one command line (can be repeated)");
    eprintln!("  --config <FILE>           Load grid settings from TOML file");
    eprintln!("  --keymap <name>           Select keybindings (default: standard)");
    eprintln!("  --keymap-file <path>      Load keybindings from TOML file");
    eprintln!("  --system-clipboard        Use the OS clipboard instead of an in-memory one");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Set CELLGRID_LOG (e.g. CELLGRID_LOG=debug) for diagnostics on stderr.");
}

struct Options {
    script: Option<PathBuf>,
    commands: Vec<String>,
    config: Option<PathBuf>,
    keymap_name: Option<String>,
    keymap_file: Option<PathBuf>,
    system_clipboard: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CELLGRID_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut options = Options {
        script: None,
        commands: Vec::new(),
        config: None,
        keymap_name: None,
        keymap_file: None,
        system_clipboard: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a value");
                    std::process::exit(1);
                }
                options.commands.push(args[i].to_string());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                options.config = Some(PathBuf::from(&args[i]));
            }
            "--keymap" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --keymap requires a value");
                    std::process::exit(1);
                }
                options.keymap_name = Some(args[i].to_string());
            }
            "--keymap-file" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --keymap-file requires a file path");
                    std::process::exit(1);
                }
                options.keymap_file = Some(PathBuf::from(&args[i]));
            }
            "--system-clipboard" => options.system_clipboard = true,
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if options.script.is_none() {
                    options.script = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    init_logging();

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    let config = GridConfig::load_or_default(options.config.as_deref())
        .context("failed to load config")?;

    let (keymap, warnings) =
        keymap::load_keymap(options.keymap_name.as_deref(), options.keymap_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let engine = build_engine(config, options.system_clipboard)?;
    let stdout = io::stdout();
    let mut runner = ScriptRunner::new(engine, keymap, stdout.lock());

    let result = drive(&mut runner, &options);
    runner.flush()?;
    result
}

fn drive<W: Write>(runner: &mut ScriptRunner<W>, options: &Options) -> anyhow::Result<()> {
    if let Some(path) = options.script.as_ref() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        runner.run_script(&text)?;
    }
    for (index, command) in options.commands.iter().enumerate() {
        runner.run_line(index + 1, command)?;
    }
    if options.script.is_none() && options.commands.is_empty() {
        for (index, line) in io::stdin().lock().lines().enumerate() {
            runner.run_line(index + 1, &line?)?;
        }
    }
    Ok(())
}

#[cfg(feature = "system-clipboard")]
fn build_engine(config: GridConfig, system_clipboard: bool) -> anyhow::Result<SheetEngine> {
    let engine = SheetEngine::new(Sheet::new("Sheet1"), config);
    if system_clipboard {
        let clipboard = cellgrid_core::SystemClipboard::new()
            .context("system clipboard unavailable")?;
        return Ok(engine.with_clipboard(Box::new(clipboard)));
    }
    Ok(engine)
}

#[cfg(not(feature = "system-clipboard"))]
fn build_engine(config: GridConfig, system_clipboard: bool) -> anyhow::Result<SheetEngine> {
    if system_clipboard {
        anyhow::bail!("built without the system-clipboard feature");
    }
    Ok(SheetEngine::new(Sheet::new("Sheet1"), config))
}
