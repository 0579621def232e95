//! Configuration management

use crate::types::MansyncError;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// mansync - Directory manifests with move-aware sync
#[derive(Parser, Debug)]
#[command(name = "mansync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output records as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan a directory and write its manifest
    Create {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Rescan a directory, report changes since the stored manifest, and save
    Update {
        /// Directory to rescan
        dir: PathBuf,
    },

    /// Check a directory against its stored manifest
    ///
    /// Exits with status 1 when any file has drifted.
    Verify {
        /// Directory to verify
        dir: PathBuf,
    },

    /// Compare the stored manifests of two directories
    Diff {
        /// Directory whose manifest is the new state
        source: PathBuf,
        /// Directory whose manifest is the old state
        target: PathBuf,
    },

    /// Make the target match the source manifest, renaming moved files in place
    Sync {
        /// Directory holding the authoritative manifest
        source: PathBuf,
        /// Directory to bring up to date (created if missing)
        target: PathBuf,

        /// Show the plan without touching the target
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy drifted files back from the source into the target
    Repair {
        /// Directory holding the authoritative manifest
        source: PathBuf,
        /// Directory to repair
        target: PathBuf,
    },
}

/// Operation selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
    Verify,
    Diff,
    Sync,
    Repair,
}

impl Mode {
    /// Whether the mode operates on a source and a target tree
    pub fn is_two_tree(&self) -> bool {
        matches!(self, Mode::Diff | Mode::Sync | Mode::Repair)
    }
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,

    /// Source directory (the only directory for single-tree modes)
    pub source: PathBuf,

    /// Target directory, present for two-tree modes
    pub target: Option<PathBuf>,

    /// Dry run (show plan, don't execute)
    pub dry_run: bool,

    /// Render output as JSON
    pub json: bool,

    /// Log verbosity (count of `-v` flags)
    pub verbose: u8,
}

impl Config {
    /// Validate configuration
    ///
    /// The source must be an existing directory. `diff` additionally needs an
    /// existing target; `sync` and `repair` create theirs. Source and target
    /// may not be the same directory.
    pub fn validate(&self) -> Result<(), MansyncError> {
        if !self.source.is_dir() {
            return Err(MansyncError::Config(format!(
                "Source path is not a directory: {}",
                self.source.display()
            )));
        }

        let Some(target) = &self.target else {
            return Ok(());
        };

        if self.mode == Mode::Diff && !target.is_dir() {
            return Err(MansyncError::Config(format!(
                "Target path is not a directory: {}",
                target.display()
            )));
        }

        if target.exists() && !target.is_dir() {
            return Err(MansyncError::Config(format!(
                "Target path exists and is not a directory: {}",
                target.display()
            )));
        }

        if same_location(&self.source, target) {
            return Err(MansyncError::Config(
                "Source and target cannot be the same".to_string(),
            ));
        }

        Ok(())
    }

    /// Default log filter for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Target directory; only two-tree modes have one
    pub fn target(&self) -> Result<&Path, MansyncError> {
        self.target
            .as_deref()
            .ok_or_else(|| MansyncError::Config(format!("{:?} takes a single directory", self.mode)))
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

impl TryFrom<Cli> for Config {
    type Error = MansyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let (mode, source, target, dry_run) = match cli.command {
            Command::Create { dir } => (Mode::Create, dir, None, false),
            Command::Update { dir } => (Mode::Update, dir, None, false),
            Command::Verify { dir } => (Mode::Verify, dir, None, false),
            Command::Diff { source, target } => (Mode::Diff, source, Some(target), false),
            Command::Sync {
                source,
                target,
                dry_run,
            } => (Mode::Sync, source, Some(target), dry_run),
            Command::Repair { source, target } => (Mode::Repair, source, Some(target), false),
        };

        let config = Config {
            mode,
            source,
            target,
            dry_run,
            json: cli.json,
            verbose: cli.verbose,
        };
        config.validate()?;
        Ok(config)
    }
}
