//! CLI argument parsing using Clap.

use std::path::PathBuf;

use clap::Parser;

/// atcomplete - complete @-triggered workspace path references
#[derive(Parser, Debug)]
#[command(name = "atcomplete")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  atcomplete @entryp                    Complete at the end of the input
  atcomplete --cursor 4 \"@acp later\"    Complete at character offset 4
  atcomplete --root ~/src/app @src/     List a directory of another workspace
  atcomplete --json @fuzzy              Print the replace range and items as JSON
")]
pub struct Cli {
    /// Input text containing the trigger
    pub text: String,

    /// Cursor position as a character offset into TEXT (default: end of TEXT)
    #[arg(short = 'c', long)]
    pub cursor: Option<usize>,

    /// Workspace root to search (default: current directory)
    #[arg(short = 'r', long, env = "ATCOMPLETE_ROOT")]
    pub root: Option<PathBuf>,

    /// Settings file to use instead of the global and project settings
    #[arg(long, env = "ATCOMPLETE_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of completions to print
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Additional ignore pattern (gitignore syntax, can use multiple times)
    #[arg(short = 'i', long = "ignore", action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Do not honor the workspace .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Print a JSON object with the replace range and items
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Cursor to use: the explicit one, or the end of the text.
    pub fn cursor(&self) -> usize {
        self.cursor.unwrap_or_else(|| self.text.chars().count())
    }
}
