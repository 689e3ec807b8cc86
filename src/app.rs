// Declare modules
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod js_pattern;
pub mod models;
pub mod safelist;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::env;

use self::cli::{Cli, Command};
use self::config::{resolve_config, write_starter, CONFIG_FILE_NAMES};
use self::engine::{PruneEngine, PurgeCss};
use self::formatter::OutputGenerator;
use self::scanner::Scanner;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    let args = Cli::parse();

    let root = match args.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let load_config = || resolve_config(args.config.as_deref(), &root, !args.no_user_safelist);

    match args.command {
        Command::Init { force } => {
            let path = root.join(CONFIG_FILE_NAMES[0]);
            write_starter(&path, force)?;
            log::info!("Wrote {}", path.display());
        }
        Command::Check { strict } => {
            let config = load_config()?;
            let plan = Scanner::new(root.clone()).strict(strict).resolve(&config)?;
            log::info!(
                "Config OK: {} content file(s), {} stylesheet(s), {} safelist rule(s)",
                plan.content_files().len(),
                plan.css.len(),
                config.safelist().len()
            );
        }
        Command::Plan { json } => {
            let config = load_config()?;
            let plan = Scanner::new(root.clone()).resolve(&config)?;
            if json {
                println!("{}", OutputGenerator::generate_plan_json(&plan)?);
            } else {
                println!("{}", OutputGenerator::generate_plan(&config, &plan));
            }
        }
        Command::Export { out, force } => {
            let module = OutputGenerator::render_purgecss(&load_config()?);
            match out {
                Some(path) => {
                    OutputGenerator::write_module(&path, &module, force)?;
                    log::info!("Wrote {}", path.display());
                }
                None => print!("{}", module),
            }
        }
        Command::Verdict { selectors, used } => {
            let config = load_config()?;
            let used: HashSet<String> = used.into_iter().collect();
            for selector in &selectors {
                let verdict = config.safelist().verdict_all(selector, &used);
                println!("{}\t{}", selector, verdict);
            }
        }
        Command::Run { bin, strict } => {
            let config = load_config()?;
            let plan = Scanner::new(root.clone()).strict(strict).resolve(&config)?;
            PurgeCss::new(bin).prune(&config, &plan)?;
        }
    }

    Ok(())
}
