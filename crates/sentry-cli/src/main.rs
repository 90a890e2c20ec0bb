//! file-sentry CLI
//!
//! Thin driver around the synchronization engine: wires up the journal,
//! rules service and poller, and exposes rule management commands.

mod cli;
mod error;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use error::Result;
use sentry_core::{
    ConfigStore, CopyService, Journal, Poller, PostCopyService, RuleStatus, RulesService,
    SystemClock, SystemProcessRunner, WatchRule,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    tracing::debug!(config = %config_path.display(), "configuration path resolved");

    match cli.command {
        Some(cmd) => execute_command(cmd, config_path),
        None => {
            println!("{} file watcher and mirror", "file-sentry".green().bold());
            println!();
            println!("Run {} for available commands.", "file-sentry --help".cyan());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}

/// Journal, rules service and poller wired together over one config path
struct Engine {
    rules: Arc<RulesService>,
    poller: Poller,
}

fn build_engine(config_path: PathBuf) -> Engine {
    let journal = Arc::new(Journal::new(Arc::new(SystemClock)));
    let store = ConfigStore::new(config_path);
    let rules = Arc::new(RulesService::new(store, journal.clone()));
    let copy = CopyService::new(journal.clone());
    let post = PostCopyService::new(Arc::new(SystemProcessRunner), journal.clone());
    let poller = Poller::new(rules.clone(), copy, post, journal);
    Engine { rules, poller }
}

fn execute_command(cmd: Commands, config_path: PathBuf) -> Result<()> {
    match cmd {
        Commands::Run => cmd_run(config_path),
        Commands::Once => cmd_once(config_path),
        Commands::AddRule {
            source,
            destination_root,
            post_action,
        } => cmd_add_rule(config_path, source, destination_root, post_action.into()),
        Commands::RemoveRule { source } => cmd_remove_rule(config_path, source),
        Commands::ListRules => cmd_list_rules(config_path),
        Commands::SetSpeed { speed } => cmd_set_speed(config_path, speed.into()),
        Commands::Status => cmd_status(config_path),
    }
}

fn cmd_run(config_path: PathBuf) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let engine = build_engine(config_path);

        if !engine.rules.is_monitoring_active() {
            println!(
                "{} monitoring is disabled in the configuration",
                "note:".yellow()
            );
            return Ok(());
        }

        engine.poller.start();
        println!(
            "{} monitoring {} rules (ctrl-c to stop)",
            "file-sentry".green().bold(),
            engine.rules.rules().len()
        );

        tokio::signal::ctrl_c().await?;
        engine.poller.stop().await;
        println!("stopped");
        Ok(())
    })
}

fn cmd_once(config_path: PathBuf) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let engine = build_engine(config_path);
        engine.poller.poll_once().await;

        for rule in engine.rules.rules() {
            print_rule(&rule);
        }
        Ok(())
    })
}

fn cmd_add_rule(
    config_path: PathBuf,
    source: PathBuf,
    destination_root: PathBuf,
    post_action: sentry_core::PostAction,
) -> Result<()> {
    let engine = build_engine(config_path);
    let rule = WatchRule::new(source, destination_root).with_post_action(post_action);
    engine.rules.add_rule(rule)?;
    println!("{}", "rule added".green());
    Ok(())
}

fn cmd_remove_rule(config_path: PathBuf, source: PathBuf) -> Result<()> {
    let engine = build_engine(config_path);
    engine.rules.remove_rule(&source)?;
    Ok(())
}

fn cmd_list_rules(config_path: PathBuf) -> Result<()> {
    let engine = build_engine(config_path);
    let rules = engine.rules.rules();
    if rules.is_empty() {
        println!("no rules configured");
        return Ok(());
    }
    for rule in rules {
        print_rule(&rule);
    }
    Ok(())
}

fn cmd_set_speed(config_path: PathBuf, speed: sentry_core::PollingSpeed) -> Result<()> {
    let engine = build_engine(config_path);
    engine.rules.set_polling_speed(speed)?;
    println!("polling interval set to {}s", speed.as_seconds());
    Ok(())
}

fn cmd_status(config_path: PathBuf) -> Result<()> {
    let engine = build_engine(config_path.clone());
    println!("config:     {}", config_path.display());
    println!(
        "interval:   every {}s",
        engine.rules.polling_speed().as_seconds()
    );
    println!(
        "monitoring: {}",
        if engine.rules.is_monitoring_active() {
            "active".green().to_string()
        } else {
            "inactive".yellow().to_string()
        }
    );
    println!("rules:      {}", engine.rules.rules().len());
    Ok(())
}

fn print_rule(rule: &WatchRule) {
    let status = match rule.status {
        RuleStatus::Synchronized => "synchronized".green(),
        RuleStatus::Copying => "copying".cyan(),
        RuleStatus::Error => "error".red(),
        RuleStatus::SourceDeleted => "source-deleted".yellow(),
    };
    let enabled = if rule.is_enabled { "" } else { " (disabled)" };
    println!(
        "{} -> {} [{}] {}{}",
        rule.source_file.display(),
        rule.destination_root.display(),
        rule.post_action,
        status,
        enabled
    );
}
