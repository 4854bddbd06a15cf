//! atcomplete - complete @-triggered workspace path references from the shell.

#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use atcomplete::autocomplete::PathCompleter;
use atcomplete::cli::Cli;
use atcomplete::config::Config;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = main_impl() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn main_impl() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let config = Config::load_with_roots(cli.config.as_deref(), &Config::global_dir(), &root)
        .context("loading settings")?;
    let mut options = config.completion_options()?;
    options.ignore_patterns.extend(cli.ignore.iter().cloned());
    if cli.no_gitignore {
        options.respect_gitignore = false;
    }
    if let Some(limit) = cli.limit {
        options.max_results = Some(limit);
    }

    let completer = PathCompleter::with_options(root, options)?;
    let response = completer.suggest(&cli.text, cli.cursor())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let value = json!({
            "replace": [response.replace.start, response.replace.end],
            "items": response.items,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        for item in &response.items {
            writeln!(out, "{item}")?;
        }
    }
    Ok(())
}
