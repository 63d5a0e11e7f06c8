//! Conveyor CLI - asset pipeline orchestrator
//!
//! Usage: conveyor <COMMAND>
//!
//! Commands:
//!   build   Run the full pipeline once
//!   dev     Build, then watch sources and serve the output with live reload
//!   clean   Remove build output, manifests, and the generated sprite
//!   graph   Print the resolved stage execution order

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use conveyor::config::ConfigWarning;
use conveyor::stages::{CleanStage, Stage, SPRITE_PATH};
use conveyor::{ui, watch, BuildContext, BuildEvent, BuildMode, Config, DevServer, Orchestrator, WatchEvent};

/// Conveyor - asset pipeline orchestrator
#[derive(Parser, Debug)]
#[command(name = "conveyor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full build pipeline once
    Build {
        /// Project root (contains conveyor.toml and src/)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Force production settings (hashing, manifests, rewriting)
        #[arg(long, conflicts_with = "development")]
        production: bool,

        /// Force development settings
        #[arg(long)]
        development: bool,
    },

    /// Build once in development settings, then watch and serve
    Dev {
        /// Project root (contains conveyor.toml and src/)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Dev server port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Remove build output, manifests, and the generated sprite
    Clean {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the resolved stage execution order
    Graph,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            root,
            production,
            development,
        } => cmd_build(&root, resolve_mode(production, development), cli.json, cli.verbose),
        Commands::Dev { root, port } => cmd_dev(&root, port, cli.json, cli.verbose),
        Commands::Clean { root, yes } => cmd_clean(&root, yes, cli.json),
        Commands::Graph => cmd_graph(),
    }
}

/// CLI flags win over `CONVEYOR_ENV`; no flag and no variable means
/// development.
fn resolve_mode(production: bool, development: bool) -> BuildMode {
    if production {
        BuildMode::Production
    } else if development {
        BuildMode::Development
    } else {
        BuildMode::from_env()
    }
}

fn cmd_build(root: &Path, mode: BuildMode, json: bool, verbose: u8) -> Result<()> {
    let (config, warnings) = Config::load_or_default(root);
    print_config_warnings(&warnings, json);

    if !json {
        println!("{} Conveyor Build", ui::icons::BUILD);
        println!("Root: {}", root.display());
        println!("Mode: {}", mode);
        println!();
    }

    let mut ctx = BuildContext::new(root, mode, config);
    let orchestrator = Orchestrator::standard();
    let color = ui::supports_color();

    orchestrator.run(&mut ctx, &mut |event| print_build_event(&event, json, color, verbose))?;
    Ok(())
}

fn cmd_dev(root: &Path, port: Option<u16>, json: bool, verbose: u8) -> Result<()> {
    let (mut config, warnings) = Config::load_or_default(root);
    print_config_warnings(&warnings, json);
    if let Some(port) = port {
        config.server.port = port;
    }

    if !json {
        println!("{} Conveyor Dev", ui::icons::WATCH);
        println!("Root: {}", root.display());
        println!();
    }

    // dev always builds with development settings
    let mut ctx = BuildContext::new(root, BuildMode::Development, config);
    let orchestrator = Orchestrator::standard();
    let color = ui::supports_color();

    orchestrator.run(&mut ctx, &mut |event| print_build_event(&event, json, color, verbose))?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let host = ctx.config().server.host.clone();
    let server_port = ctx.config().server.port;
    let server = DevServer::start(&host, server_port, ctx.output_root(), running.clone())?;

    if !json {
        println!();
        println!(
            "{} Serving {} at http://{}",
            ui::icons::SERVER,
            ctx.output_root().display(),
            server.addr()
        );
        println!("Press Ctrl+C to stop");
        println!();
    }

    watch(&orchestrator, &mut ctx, running, |event| {
        print_watch_event(&event, json, color)
    })?;

    Ok(())
}

fn cmd_clean(root: &Path, yes: bool, json: bool) -> Result<()> {
    let (config, warnings) = Config::load_or_default(root);
    print_config_warnings(&warnings, json);

    let mut ctx = BuildContext::new(root, BuildMode::Development, config);

    if !json {
        println!("{} Conveyor Clean", ui::icons::CLEAN);
        println!("  - {}", ctx.output_root().display());
        println!("  - {}", ctx.manifests().root().display());
        println!("  - {}", ctx.resolve(SPRITE_PATH).display());
        println!();
    }

    if !yes && !json {
        use dialoguer::Confirm;
        let confirmed = Confirm::new()
            .with_prompt("Remove build output?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    CleanStage.run(&mut ctx)?;

    if json {
        println!(r#"{{"event":"clean_complete"}}"#);
    } else {
        println!(
            "{} Clean complete",
            ui::paint(ui::icons::SUCCESS, ui::colors::SUCCESS, ui::supports_color())
        );
    }
    Ok(())
}

fn cmd_graph() -> Result<()> {
    let orchestrator = Orchestrator::standard();
    print!("{}", orchestrator.describe()?);
    Ok(())
}

fn print_config_warnings(warnings: &[ConfigWarning], json: bool) {
    for warning in warnings {
        if json {
            println!(
                r#"{{"event":"config_warning","key":"{}"}}"#,
                warning.key
            );
        } else {
            eprintln!(
                "{} Unknown config key '{}' in {}",
                ui::icons::WARNING,
                warning.key,
                warning.file.display()
            );
        }
    }
}

fn print_build_event(event: &BuildEvent, json: bool, color: bool, verbose: u8) {
    if json {
        println!("{}", event.to_json());
        return;
    }
    match event {
        BuildEvent::BuildStarted { .. } => {}
        BuildEvent::StageStarted { stage } => {
            if verbose > 0 {
                println!("  {} {}...", ui::paint("○", ui::colors::DIM, color), stage);
            }
        }
        BuildEvent::StageComplete {
            stage,
            written,
            skipped,
            duration_ms,
        } => {
            let summary = if *skipped > 0 {
                format!("{stage}: {written} written, {skipped} unchanged ({duration_ms}ms)")
            } else {
                format!("{stage}: {written} written ({duration_ms}ms)")
            };
            println!(
                "  {} {}",
                ui::paint(ui::icons::SUCCESS, ui::colors::SUCCESS, color),
                summary
            );
        }
        BuildEvent::StageFailed { message, .. } => {
            eprintln!(
                "  {} {}",
                ui::paint(ui::icons::ERROR, ui::colors::ERROR, color),
                message
            );
        }
        BuildEvent::BuildComplete {
            stages,
            duration_ms,
        } => {
            println!();
            println!(
                "{} Build complete: {} stages in {}ms",
                ui::paint(ui::icons::SUCCESS, ui::colors::SUCCESS, color),
                stages,
                duration_ms
            );
        }
    }
}

fn print_watch_event(event: &WatchEvent, json: bool, color: bool) {
    if json {
        println!("{}", event.to_json());
        return;
    }
    match event {
        WatchEvent::WatchStarted { root } => {
            println!("{} Watching: {}", ui::icons::WATCH, root);
        }
        WatchEvent::FileChanged { path } => {
            println!("{} Changed: {}", ui::icons::CHANGE, path);
        }
        WatchEvent::RunStarted { stages } => {
            println!("{} Rebuilding: {}", ui::icons::RERUN, stages.join(", "));
        }
        WatchEvent::StageComplete {
            stage,
            written,
            skipped,
        } => {
            let summary = if *skipped > 0 {
                format!("{stage}: {written} written, {skipped} unchanged")
            } else {
                format!("{stage}: {written} written")
            };
            println!(
                "  {} {}",
                ui::paint(ui::icons::SUCCESS, ui::colors::SUCCESS, color),
                summary
            );
        }
        WatchEvent::StageFailed { stage, message } => {
            // Visible notification; the loop keeps watching
            eprintln!(
                "  {} {}",
                ui::paint(ui::icons::ERROR, ui::colors::ERROR, color),
                ui::paint(&format!("{stage}: {message}"), ui::colors::ERROR, color)
            );
        }
        WatchEvent::Shutdown => {
            println!();
            println!("Shutting down...");
        }
    }
}
