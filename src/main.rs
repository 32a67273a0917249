//! docsite - documentation-site page behaviors harness
//!
//! Loads an HTML page into an in-process page host, installs every behavior the page supports,
//! replays a scenario of user interactions and prints the resulting DOM.

mod cli;
mod scenario;

use anyhow::{Context, Result};
use behaviors::{BehaviorConfig, install};
use clap::Parser;
use cli::{Cli, Commands};
use html::dom_utils::outline;
use page::{JsonFileStorage, MemoryStorage, Page, Storage};
use scenario::Scenario;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            page,
            scenario,
            config,
            storage,
            outline_cap,
        } => handle_run(&page, scenario, config, storage, outline_cap),
        Commands::Outline { page, outline_cap } => handle_outline(&page, outline_cap),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_page(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read page {}", path.display()))?;
    if !html::looks_like_html(&text) {
        log::warn!("{} does not look like HTML", path.display());
    }
    Ok(text)
}

fn load_config(path: Option<PathBuf>) -> Result<BehaviorConfig> {
    let Some(path) = path else {
        return Ok(BehaviorConfig::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    BehaviorConfig::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
}

fn open_storage(path: Option<PathBuf>) -> Result<Box<dyn Storage>> {
    match path {
        Some(path) => Ok(Box::new(JsonFileStorage::open(&path)?)),
        None => Ok(Box::new(MemoryStorage::new())),
    }
}

fn handle_run(
    page_path: &Path,
    scenario_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    storage_path: Option<PathBuf>,
    outline_cap: usize,
) -> Result<()> {
    let text = read_page(page_path)?;
    let config = load_config(config_path)?;
    let storage = open_storage(storage_path)?;
    let scenario = match scenario_path {
        Some(path) => Scenario::load(&path)?,
        None => Scenario::default(),
    };

    let mut page = scenario.prepare(Page::from_html(&text).with_storage(storage))?;
    let mut behaviors = install(&mut page, &config);
    let startup = behaviors.run_until_idle(&mut page);
    let replayed = scenario.replay(&mut page, &mut behaviors)?;

    println!("behaviors: {}", behaviors.names().join(", "));
    println!("events: {startup} at startup, {replayed} replayed");
    println!("scroll_y: {}", page.scroll_y());
    for line in outline(page.document(), outline_cap) {
        println!("{line}");
    }
    Ok(())
}

fn handle_outline(page_path: &Path, outline_cap: usize) -> Result<()> {
    let text = read_page(page_path)?;
    let page = Page::from_html(&text);
    for line in outline(page.document(), outline_cap) {
        println!("{line}");
    }
    Ok(())
}
