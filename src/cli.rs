//! Command-line front end: run mask edits without a window.
//!
//! ```text
//! maskedit edit --image cell.png --mask og_mask_cell.png --output mask_cell.png --clean 5
//! maskedit batch --images imgs/ --masks masks/ --output out/ --invert
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::batch::{BatchError, FolderSession};
use crate::config::{ConfigError, EditorConfig, LogLevel};
use crate::error::EditorError;
use crate::mask::MaskColor;
use crate::model::ModelRect;
use crate::session::EditorSession;

/// Headless binary mask editor.
#[derive(Parser, Debug)]
#[command(name = "maskedit", version, about = "Edit binary segmentation masks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file; defaults to the per-user config if present
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Edit one image's mask
    Edit(EditArgs),
    /// Edit every image in a folder
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Source image
    #[arg(long, value_name = "FILE")]
    pub image: PathBuf,

    /// Existing mask; a blank mask is used when omitted
    #[arg(long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Where to write the edited mask (PNG)
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub ops: MaskOps,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder of source images
    #[arg(long, value_name = "DIR")]
    pub images: PathBuf,

    /// Folder searched for existing masks
    #[arg(long, value_name = "DIR")]
    pub masks: PathBuf,

    /// Folder the edited masks are written to
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub ops: MaskOps,
}

/// Edits applied to each mask, always in the order clean, fill, delete,
/// invert.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct MaskOps {
    /// Remove specks and fill holes with this kernel size
    #[arg(long, value_name = "KERNEL")]
    pub clean: Option<u32>,

    /// Set a rectangle to foreground
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub fill_rect: Option<ModelRect>,

    /// Set a rectangle to background
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub delete_rect: Option<ModelRect>,

    /// Swap foreground and background
    #[arg(long)]
    pub invert: bool,
}

impl MaskOps {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the edits to a session. Each one is a single undo step.
    pub fn apply(&self, session: &mut EditorSession) {
        if let Some(kernel) = self.clean {
            session.clear_selection();
            session.clean_noise(kernel);
        }
        if let Some(rect) = self.fill_rect {
            let color = session.settings().brush_color;
            session.set_brush_color(MaskColor::White);
            session.select_rect(rect);
            session.fill_selection();
            session.set_brush_color(color);
        }
        if let Some(rect) = self.delete_rect {
            session.select_rect(rect);
            session.delete_selection();
        }
        session.clear_selection();
        if self.invert {
            session.invert();
        }
    }
}

/// Errors reported by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Failed to create {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} images failed")]
    BatchIncomplete { failed: usize, total: usize },
}

/// Parse `x,y,w,h` into a rectangle.
pub fn parse_rect(text: &str) -> Result<ModelRect, String> {
    let parts: Vec<u32> = text
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid rectangle {:?}: {}", text, e))?;
    match parts.as_slice() {
        &[x, y, width, height] => Ok(ModelRect::new(x, y, width, height)),
        _ => Err(format!("expected x,y,w,h but got {:?}", text)),
    }
}

/// Parse a log level name, case-insensitively.
pub fn parse_log_level(text: &str) -> Result<LogLevel, String> {
    LogLevel::all()
        .iter()
        .copied()
        .find(|level| level.name().eq_ignore_ascii_case(text))
        .ok_or_else(|| format!("unknown log level {:?}", text))
}

impl Cli {
    /// The configuration named by `--config`, else the per-user file, else
    /// defaults.
    pub fn load_config(&self) -> Result<EditorConfig, ConfigError> {
        match &self.config {
            Some(path) => EditorConfig::load(path),
            None => Ok(EditorConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    /// `--log-level` if given, else the configured level.
    pub fn log_filter(&self, config: &EditorConfig) -> log::LevelFilter {
        self.log_level
            .unwrap_or(config.preferences.log_level)
            .to_level_filter()
    }
}

/// Run a parsed command line.
pub fn run(cli: &Cli, config: EditorConfig) -> Result<(), CliError> {
    match &cli.command {
        Command::Edit(args) => run_edit(args, &config),
        Command::Batch(args) => run_batch(args, config),
    }
}

fn run_edit(args: &EditArgs, config: &EditorConfig) -> Result<(), CliError> {
    let mut session = EditorSession::open(&args.image, args.mask.as_deref())?;
    config.apply_to(&mut session);
    if args.ops.is_empty() {
        log::warn!("No edits requested; writing the mask unchanged");
    }
    args.ops.apply(&mut session);

    create_parent(&args.output)?;
    session.save_mask(&args.output)?;
    log::info!(
        "💾 Wrote {:?} ({} edits)",
        args.output,
        session.history().undo_count()
    );
    Ok(())
}

fn run_batch(args: &BatchArgs, config: EditorConfig) -> Result<(), CliError> {
    let mut folder =
        FolderSession::open(&args.images, &args.masks, &args.output, config)?.with_auto_save(false);
    let total = folder.images().len();
    let mut failed = 0;

    for index in 0..total {
        if let Err(e) = folder.go_to(index) {
            log::error!("Skipping {:?}: {}", folder.images()[index], e);
            failed += 1;
            continue;
        }
        if let Some(session) = folder.session_mut() {
            args.ops.apply(session);
        }
        folder.save_current()?;
        log::info!("[{}] {}", folder.progress(), folder.current_name());
    }

    if failed > 0 {
        return Err(CliError::BatchIncomplete { failed, total });
    }
    log::info!("✅ Processed {} images", total);
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| CliError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
