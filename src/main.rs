//! CLI entry point for codebind

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use codebind::{
    CombineConfig, CombineRequest, Combiner, DiskTree, Error, FileEntry, FileTree, HeaderInspector,
    NoBuffers, NoDiagnostics, OperationLog, SelectionMode, Session, SessionSnapshot, Settings,
    TreeConfig, TreeGenerator, TreeMode, TreeScope, Validator, print_log,
};
use termcolor::ColorChoice;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

/// Terminal color choice for the log printer.
///
/// `Always` and `Never` are passed through untouched; `Auto` is resolved here
/// so the printer does not second-guess it.
fn color_choice(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if should_use_color(mode) => ColorChoice::Always,
        ColorMode::Auto => ColorChoice::Never,
    }
}

/// Selection mode for `combine` and `validate`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ModeArg {
    /// One directory; output goes under it
    #[default]
    Single,
    /// Several directories; output goes under the project root
    Multi,
    /// Individual files; output goes under the project root
    Files,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => SelectionMode::SingleDir,
            ModeArg::Multi => SelectionMode::MultiDir,
            ModeArg::Files => SelectionMode::SpecificFiles,
        }
    }
}

/// What a tree report shows
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TreeModeArg {
    /// Files and folders
    #[default]
    Full,
    /// Folders only
    Folders,
    /// Folders only, down to --depth levels
    Limited,
}

impl From<TreeModeArg> for TreeMode {
    fn from(mode: TreeModeArg) -> Self {
        match mode {
            TreeModeArg::Full => TreeMode::Full,
            TreeModeArg::Folders => TreeMode::FoldersOnly,
            TreeModeArg::Limited => TreeMode::LimitedFoldersOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "codebind")]
#[command(about = "Bind source files into one indexed document, or map a directory tree")]
#[command(version)]
struct Cli {
    /// Increase diagnostic logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence diagnostic logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto", global = true)]
    color: ColorMode,

    /// Settings file (default: <project root>/.codebind.json if present)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine source files into Combined_Codes_R<NN>.md
    Combine {
        /// What the paths are
        #[arg(short, long, value_enum, default_value = "single")]
        mode: ModeArg,

        /// Project root (default: current directory)
        #[arg(long = "project-root", value_name = "DIR")]
        project_root: Option<PathBuf>,

        /// Skip the pre-flight header and mode checks
        #[arg(long = "no-validate")]
        no_validate: bool,

        /// Directories or files to combine
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Write a directory tree report
    Tree {
        #[arg(short, long, value_enum, default_value = "full")]
        mode: TreeModeArg,

        /// Depth limit for --mode limited
        #[arg(short = 'L', long = "depth")]
        depth: Option<usize>,

        /// Project root (default: current directory)
        #[arg(long = "project-root", value_name = "DIR")]
        project_root: Option<PathBuf>,

        /// Directories to map (default: the whole project root)
        paths: Vec<PathBuf>,
    },

    /// Check paths without combining them
    Validate {
        #[arg(short, long, value_enum, default_value = "single")]
        mode: ModeArg,

        /// Project root used to find settings (default: current directory)
        #[arg(long = "project-root", value_name = "DIR")]
        project_root: Option<PathBuf>,

        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn setup_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", level);
}

/// Resolve `path` against the current directory, following symlinks so
/// that every entry shares one spelling of the project root.
fn resolve(path: &Path) -> Result<PathBuf, String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    absolute
        .canonicalize()
        .map_err(|_| format!("cannot access '{}': No such file or directory", path.display()))
}

fn entry_for(tree: &DiskTree, path: &Path) -> Result<FileEntry, String> {
    let resolved = resolve(path)?;
    tree.entry(&resolved)
        .ok_or_else(|| format!("cannot access '{}'", path.display()))
}

fn resolve_project_root(tree: &DiskTree, path: Option<&Path>) -> Result<FileEntry, String> {
    let root = entry_for(tree, path.unwrap_or(Path::new(".")))?;
    if !root.is_dir() {
        return Err(format!("project root '{}' is not a directory", root.path().display()));
    }
    Ok(root)
}

fn load_settings(config: Option<&Path>, root: &FileEntry) -> Result<Settings, String> {
    let loaded = match config {
        Some(path) => Settings::load(path),
        None => Settings::discover(root.path()),
    };
    loaded.map_err(|e| e.to_string())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Outcome of a command: the log to show and whether it succeeded.
struct Outcome {
    log: OperationLog,
    success: bool,
}

fn run_combine(
    cli: &Cli,
    mode: SelectionMode,
    project_root: Option<&Path>,
    no_validate: bool,
    paths: &[PathBuf],
) -> Result<Outcome, String> {
    let tree = DiskTree::new();
    let root = resolve_project_root(&tree, project_root)?;
    let settings = load_settings(cli.config.as_deref(), &root)?;
    let config = CombineConfig::from_settings(&settings).map_err(|e| e.to_string())?;
    let items = paths
        .iter()
        .map(|p| entry_for(&tree, p))
        .collect::<Result<Vec<_>, _>>()?;

    if mode == SelectionMode::SingleDir && items.len() > 1 {
        let mut log = OperationLog::new();
        log.error(format!(
            "Mode '{}' takes exactly one folder, got {}.",
            mode.display_name(),
            items.len()
        ));
        return Ok(Outcome {
            log,
            success: false,
        });
    }

    let mut session = if no_validate {
        log::info!("Skipping validation of {} item(s)", items.len());
        Session::restore(
            SessionSnapshot {
                mode,
                selected: items.iter().map(|e| e.path().to_path_buf()).collect(),
                log: OperationLog::new(),
            },
            &tree,
        )
    } else {
        let inspector = HeaderInspector::new(&tree, &NoBuffers)
            .with_exempt_extensions(config.order_exempt_extensions.clone());
        let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &config.exclusions);
        let mut session = Session::new(mode);
        if !session.add(&validator, items) {
            return Ok(Outcome {
                log: session.log().clone(),
                success: false,
            });
        }
        session
    };

    let combiner = Combiner::new(&tree, &NoBuffers, &config);
    let result = combiner.run(&mut session, root, now());
    if let Err(Error::EmptySelection(reason)) = &result {
        log::debug!("Nothing combined: {}", reason);
    }
    let success = result.is_ok();
    Ok(Outcome {
        log: session.log().clone(),
        success,
    })
}

fn run_tree(
    cli: &Cli,
    mode: TreeMode,
    depth: Option<usize>,
    project_root: Option<&Path>,
    paths: &[PathBuf],
) -> Result<Outcome, String> {
    let tree = DiskTree::new();
    let root = resolve_project_root(&tree, project_root)?;
    let settings = load_settings(cli.config.as_deref(), &root)?;
    let mut log = OperationLog::new();

    let config = match TreeConfig::new(&settings, mode, depth) {
        Ok(config) => config,
        Err(e) => {
            log::debug!("Rejected tree configuration: {}", e);
            let depth_ok = mode != TreeMode::LimitedFoldersOnly || depth.is_some_and(|d| d >= 1);
            if depth_ok {
                log.error(format!("Error: {}", e));
            } else {
                log.error("Error: Invalid depth.");
            }
            return Ok(Outcome {
                log,
                success: false,
            });
        }
    };

    let scope = if paths.is_empty() {
        TreeScope::ProjectRoot
    } else {
        let mut dirs = Vec::with_capacity(paths.len());
        for path in paths {
            let dir = entry_for(&tree, path)?;
            if dir.is_dir() {
                dirs.push(dir);
            } else {
                log.warning(format!("Ignored '{}': not a directory.", dir.name()));
            }
        }
        TreeScope::Selected(dirs)
    };

    let generator = TreeGenerator::new(&tree, &config, &root);
    let success = generator.run(&scope, now(), &mut log).is_ok();
    Ok(Outcome { log, success })
}

fn run_validate(
    cli: &Cli,
    mode: SelectionMode,
    project_root: Option<&Path>,
    paths: &[PathBuf],
) -> Result<Outcome, String> {
    let tree = DiskTree::new();
    let root = resolve_project_root(&tree, project_root)?;
    let settings = load_settings(cli.config.as_deref(), &root)?;
    let config = CombineConfig::from_settings(&settings).map_err(|e| e.to_string())?;
    let items = paths
        .iter()
        .map(|p| entry_for(&tree, p))
        .collect::<Result<Vec<_>, _>>()?;

    let inspector = HeaderInspector::new(&tree, &NoBuffers)
        .with_exempt_extensions(config.order_exempt_extensions.clone());
    let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &config.exclusions);
    let findings = validator.validate_selection(&items, mode);

    let mut log = OperationLog::new();
    for finding in &findings {
        log.push(finding.into(), finding.message.clone());
    }
    if findings.is_empty() {
        log.success(format!("{} item(s) passed validation.", items.len()));
    }
    Ok(Outcome {
        log,
        success: findings.is_empty(),
    })
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.quiet, cli.verbose);

    let outcome = match &cli.command {
        Command::Combine {
            mode,
            project_root,
            no_validate,
            paths,
        } => run_combine(
            &cli,
            (*mode).into(),
            project_root.as_deref(),
            *no_validate,
            paths,
        ),
        Command::Tree {
            mode,
            depth,
            project_root,
            paths,
        } => run_tree(&cli, (*mode).into(), *depth, project_root.as_deref(), paths),
        Command::Validate {
            mode,
            project_root,
            paths,
        } => run_validate(&cli, (*mode).into(), project_root.as_deref(), paths),
    };

    let outcome = outcome.unwrap_or_else(|e| {
        eprintln!("codebind: {}", e);
        process::exit(1);
    });

    if let Err(e) = print_log(&outcome.log, color_choice(cli.color)) {
        eprintln!("codebind: error writing output: {}", e);
        process::exit(1);
    }
    if !outcome.success {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_color_modes_are_not_overridden() {
        assert_eq!(color_choice(ColorMode::Always), ColorChoice::Always);
        assert_eq!(color_choice(ColorMode::Never), ColorChoice::Never);
    }
}
