//! spa-router command line.
//!
//! ```text
//! spa-router check   -c routes.toml
//! spa-router resolve -c routes.toml /app/guides/history-api
//! spa-router replay  -c routes.toml [--origin URL] [--start PATH] script.txt
//! ```
//!
//! `resolve` and `replay` print JSON on stdout; logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use spa_router::config::{load_config, RouterConfig};
use spa_router::dispatch::{ClickOutcome, DispatchOutcome};
use spa_router::navigation::location::split_suffix;
use spa_router::navigation::{AnchorInfo, BasePath, ClickEvent, MemoryHistory, MemoryLink, Modifiers};
use spa_router::observability::init_logging;
use spa_router::{NavigateOptions, Router};

#[derive(Parser)]
#[command(name = "spa-router")]
#[command(about = "Inspect and replay client-side route tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a route configuration
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Resolve one browser path against the route table
    Resolve {
        #[arg(short, long)]
        config: PathBuf,
        /// Browser path, including the base directory (e.g. /app/guides)
        path: String,
    },
    /// Drive a router over an in-memory history from a script ("-" reads stdin)
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = "https://localhost")]
        origin: String,
        /// App path loaded before the first step
        #[arg(long, default_value = "/")]
        start: String,
        script: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { config } => {
            let config = load(&config)?;
            println!(
                "OK: {} routes, {} nav links, base {}",
                config.routes.len(),
                config.nav_links.len(),
                BasePath::new(&config.base_dir).as_str()
            );
            for route in &config.routes {
                println!("  {:<32} {}", route.template, route.view);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { config, path } => {
            let config = load(&config)?;
            resolve(&config, &path)
        }
        Commands::Replay {
            config,
            origin,
            start,
            script,
        } => {
            let config = load(&config)?;
            let script = read_script(&script)?;
            replay(&config, &origin, &start, &script)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: &Path) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    if let Err(err) = init_logging(&config.observability) {
        eprintln!("Logging disabled: {err}");
    }
    tracing::debug!(config = %path.display(), routes = config.routes.len(), "Configuration loaded");
    Ok(config)
}

fn read_script(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut script = String::new();
        std::io::stdin().read_to_string(&mut script)?;
        Ok(script)
    } else {
        std::fs::read_to_string(path)
    }
}

fn resolve(config: &RouterConfig, browser_path: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let table = config.route_table()?;
    let base = BasePath::new(&config.base_dir);
    let (path, _) = split_suffix(browser_path);
    let app_path = base.to_app_path(path)?;

    let Some(resolved) = table.resolve(&app_path) else {
        println!("{}", json!({ "app_path": app_path, "template": null }));
        return Ok(ExitCode::FAILURE);
    };

    let output = json!({
        "template": resolved.route.template(),
        "view": resolved.route.handler(),
        "params": resolved.params,
        "app_path": app_path,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Navigate(String),
    Replace(String),
    Back,
    Forward,
    Click(ClickEvent),
}

fn parse_step(line: &str) -> Result<Step, String> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or("empty step")?;
    let step = match command {
        "navigate" | "replace" => {
            let path = words.next().ok_or_else(|| format!("{command} needs a path"))?;
            if command == "navigate" {
                Step::Navigate(path.to_string())
            } else {
                Step::Replace(path.to_string())
            }
        }
        "back" => Step::Back,
        "forward" => Step::Forward,
        "click" => {
            let href = words.next().ok_or("click needs an href")?;
            let mut anchor = AnchorInfo::new(href);
            let mut modifiers = Modifiers::default();
            for flag in words.by_ref() {
                match flag {
                    "blank" => anchor = anchor.with_target("_blank"),
                    "download" => anchor = anchor.with_download(),
                    "external" => anchor = anchor.with_external(),
                    "meta" => modifiers.meta = true,
                    "ctrl" => modifiers.ctrl = true,
                    "shift" => modifiers.shift = true,
                    "alt" => modifiers.alt = true,
                    other => return Err(format!("unknown click flag '{other}'")),
                }
            }
            Step::Click(ClickEvent::on_link(anchor).with_modifiers(modifiers))
        }
        other => return Err(format!("unknown step '{other}'")),
    };

    match words.next() {
        Some(extra) => Err(format!("unexpected '{extra}' after {command}")),
        None => Ok(step),
    }
}

fn outcome_name(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Dispatched { .. } => "dispatched",
        DispatchOutcome::Unchanged => "unchanged",
        DispatchOutcome::NoMatch => "no_match",
        DispatchOutcome::OutsideBase => "outside_base",
    }
}

type Renders = Arc<Mutex<Vec<Value>>>;

fn replay(
    config: &RouterConfig,
    origin: &str,
    start: &str,
    script: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = BasePath::new(&config.base_dir);
    let origin = url::Url::parse(origin)?;
    let (start_path, suffix) = split_suffix(start);
    let history = MemoryHistory::new(
        origin.join(&format!("{}{}", base.to_browser_path(start_path), suffix))?,
    );
    let renders: Renders = Arc::default();

    let mut builder = Router::builder(history.clone()).base_dir(&config.base_dir);
    for route in &config.routes {
        let view = route.view.clone();
        let renders = Arc::clone(&renders);
        builder = builder.route(route.template.clone(), move |ctx| {
            renders
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(json!({
                    "view": view,
                    "template": ctx.template,
                    "path": ctx.location.path(),
                    "search": ctx.location.search(),
                    "hash": ctx.location.hash(),
                    "params": ctx.params,
                    "generation": ctx.generation,
                }));
        });
    }
    let mut links = Vec::new();
    for link in &config.nav_links {
        let marker = MemoryLink::new();
        builder = builder.nav_link(&link.href, marker.clone());
        links.push((link.href.clone(), marker));
    }
    let router = builder.build()?;

    let outcome = outcome_name(&router.start()?);
    emit("start", outcome, &renders, &links, &history)?;

    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).map_err(|msg| format!("line {}: {msg}", number + 1))?;

        let before = router.generation();
        let outcome = match step {
            Step::Navigate(path) => outcome_name(&router.navigate(&path, NavigateOptions::push())?),
            Step::Replace(path) => outcome_name(&router.navigate(&path, NavigateOptions::replace())?),
            Step::Back => traversal(history.back(), before, &router),
            Step::Forward => traversal(history.forward(), before, &router),
            Step::Click(event) => match router.handle_click(&event)? {
                ClickOutcome::Ignored => "ignored",
                ClickOutcome::Intercepted(outcome) => outcome_name(&outcome),
            },
        };
        emit(line, outcome, &renders, &links, &history)?;
    }
    Ok(())
}

fn traversal(moved: bool, before: u64, router: &Router) -> &'static str {
    if !moved {
        "at_boundary"
    } else if router.generation() != before {
        "dispatched"
    } else {
        "not_dispatched"
    }
}

fn emit(
    step: &str,
    outcome: &str,
    renders: &Renders,
    links: &[(String, MemoryLink)],
    history: &MemoryHistory,
) -> Result<(), serde_json::Error> {
    let renders: Vec<Value> = renders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain(..)
        .collect();
    let mut nav = Map::new();
    for (href, marker) in links {
        nav.insert(href.clone(), serde_json::to_value(marker.state())?);
    }

    let line = json!({
        "step": step,
        "outcome": outcome,
        "renders": renders,
        "nav": nav,
        "history": { "index": history.index(), "length": history.len() },
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}
