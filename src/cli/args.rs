//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::application::MatchMode;

/// Find the most recent common ancestor of regex-selected tips in a rooted Newick tree
#[derive(Parser, Debug)]
#[command(name = "mrca")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .mrca.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Pattern options shared by the tree commands.
#[derive(Args, Debug, Clone, Default)]
pub struct MatchArgs {
    /// Pattern must match the whole tip name
    #[arg(long)]
    pub full_match: bool,

    /// Override the configured match mode
    #[arg(long, value_enum, conflicts_with = "full_match")]
    pub match_mode: Option<MatchMode>,

    /// Case-insensitive pattern
    #[arg(short, long)]
    pub ignore_case: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the MRCA of the tips matching each regex
    Find {
        /// Tree file to read (in Newick format)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        tree: PathBuf,
        /// Regex of tip names (repeat for several lookups)
        #[arg(short, long, required = true)]
        regex: Vec<String>,
        #[command(flatten)]
        matching: MatchArgs,
        /// Text printed when the MRCA is the unnamed root
        #[arg(long)]
        root_label: Option<String>,
        /// Also list the tips below each MRCA
        #[arg(short, long)]
        list_tips: bool,
    },

    /// List the tips matching a regex
    Tips {
        /// Tree file to read (in Newick format)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        tree: PathBuf,
        /// Regex of tip names
        #[arg(short, long)]
        regex: String,
        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Show the tree, marking matching tips and their MRCA
    Show {
        /// Tree file to read (in Newick format)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        tree: PathBuf,
        /// Regex of tip names to mark
        #[arg(short, long)]
        regex: Option<String>,
        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
