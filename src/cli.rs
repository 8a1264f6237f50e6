// src/cli.rs

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["repo", "changesets"])))]
pub struct Args {
    /// Path to the git repository to read history from
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// JSON file with already-parsed changesets, oldest first
    #[arg(long)]
    pub changesets: Option<PathBuf>,

    /// `;`-separated regular expressions marking a commit message as a bug fix
    #[arg(long, env = "VCS_CHURN_BUG_REGEXES")]
    pub bug_regexes: Option<String>,

    /// JSON file with work items exported from the bug database
    #[arg(long)]
    pub work_items: Option<PathBuf>,

    /// File to write the output to
    #[arg(short, long)]
    pub output: PathBuf,

    /// What to write
    #[arg(long, value_enum, default_value_t = OutputType::Daily)]
    pub output_type: OutputType,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Every per-file per-day churn record
    Daily,
    /// One measure per file for every registered metric
    Measures,
}
