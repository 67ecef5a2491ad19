use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use doodlepad::config::Config;
use doodlepad::export::{ExportFileConfig, ExportFormat, save_export};
use doodlepad::input::InputState;
use doodlepad::replay;
use doodlepad::session::{self, FileStore, SessionOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "doodlepad")]
#[command(version, about = "Freehand raster drawing surface with pan/zoom and undo/redo")]
struct Cli {
    /// Use this config file instead of ~/.config/doodlepad/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replay a JSON-lines input script against the canvas
    #[arg(long, short = 'r', value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Start from a blank canvas even if a saved one exists
    #[arg(long, action = ArgAction::SetTrue)]
    no_restore: bool,

    /// Persist the canvas to the saved slot when done
    #[arg(long, short = 's', action = ArgAction::SetTrue)]
    save: bool,

    /// Export the canvas into the configured export directory
    #[arg(long, short = 'e', action = ArgAction::SetTrue)]
    export: bool,

    /// Export the canvas to this exact path
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Export format (png or jpeg); defaults to the configured format
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// JPEG quality 1-100; defaults to the configured quality
    #[arg(long, value_name = "N")]
    quality: Option<u8>,

    /// Show information about the saved canvas and exit
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["clear_session", "replay"])]
    session_info: bool,

    /// Delete the saved canvas (and its backup) and exit
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "replay")]
    clear_session: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let (mut config, config_dir) = load_config(cli.config.as_deref())?;
    let options = session::options_from_config(&config.session, &config_dir)?;

    if cli.clear_session {
        return run_clear_session(&options);
    }
    if cli.session_info {
        return run_session_info(&options);
    }

    let wants_output = cli.replay.is_some() || cli.save || cli.export || cli.output.is_some();
    if !wants_output {
        print_usage();
        return Ok(());
    }

    config.session.restore_on_start = options.restore_on_start && !cli.no_restore;
    let mut state = InputState::from_config(&config, Box::new(FileStore::new(options)))?;

    if let Some(script_path) = &cli.replay {
        let events = replay::load_script(script_path)?;
        let summary = replay::run_script(&mut state, &events)?;
        println!(
            "Replayed {} event(s) ({} without effect); history has {} entr{}",
            summary.events,
            summary.ignored,
            state.history().len(),
            if state.history().len() == 1 { "y" } else { "ies" }
        );
    }

    if cli.save {
        state.save()?;
        println!("Canvas saved");
    }

    if cli.export || cli.output.is_some() {
        let format: ExportFormat = cli
            .format
            .as_deref()
            .unwrap_or(config.export.format.as_str())
            .parse()?;
        let quality = cli.quality.unwrap_or(config.export.quality);
        let bytes = state.export(format, quality)?;

        let path = match &cli.output {
            Some(path) => {
                fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                path.clone()
            }
            None => save_export(&bytes, format, &ExportFileConfig::from(&config.export))?,
        };
        println!("Exported {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!("Config file {} does not exist", path.display()));
            }
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((Config::load_from(path)?, dir))
        }
        None => Ok((Config::load()?, Config::config_directory()?)),
    }
}

fn run_clear_session(options: &SessionOptions) -> Result<()> {
    let outcome = session::clear_session(options)?;
    if outcome.removed_session || outcome.removed_backup || outcome.removed_lock {
        println!("Cleared saved canvas in {}", options.base_dir.display());
        println!("  Slot file removed: {}", yes_no(outcome.removed_session));
        println!("  Backup removed:    {}", yes_no(outcome.removed_backup));
        println!("  Lock removed:      {}", yes_no(outcome.removed_lock));
    } else {
        println!("No saved canvas found in {}", options.base_dir.display());
    }
    Ok(())
}

fn run_session_info(options: &SessionOptions) -> Result<()> {
    let info = session::inspect_session(options)?;
    println!("Saved canvas");
    println!("  Slot file: {}", info.slot_path.display());
    if info.exists {
        println!("  Size:      {} bytes", info.size_bytes.unwrap_or(0));
        if let Some(modified) = info.modified {
            let modified: chrono::DateTime<chrono::Local> = modified.into();
            println!("  Modified:  {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        match info.dimensions {
            Some((w, h)) => println!("  Canvas:    {}x{}", w, h),
            None => println!("  Canvas:    unreadable"),
        }
    } else {
        println!("  (none)");
    }
    println!(
        "  Backup:    {}{}",
        info.backup_path.display(),
        match info.backup_size_bytes {
            Some(size) if info.backup_exists => format!(" ({} bytes)", size),
            _ => " (none)".to_string(),
        }
    );
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_usage() {
    println!("doodlepad: Freehand raster drawing surface");
    println!();
    println!("Usage:");
    println!("  doodlepad --replay strokes.jsonl --export   Replay input and export an image");
    println!("  doodlepad --replay strokes.jsonl --save     Replay input and keep the canvas");
    println!("  doodlepad --output canvas.png               Export the saved canvas");
    println!("  doodlepad --session-info                    Show the saved canvas slot");
    println!("  doodlepad --clear-session                   Delete the saved canvas");
    println!("  doodlepad --help                            Show all options");
}
