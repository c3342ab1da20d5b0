// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI entry point for keybind-overrider
//!
//! Provides a command-line interface for canonicalizing accelerators,
//! checking registry snapshots for conflicts, and running override passes.

use clap::{Args, Parser, Subcommand};
use colored::*;
use keybind_overrider::config::{
    FileRegistry, FileStore, FileWatcher, OverrideLedger, DEFAULT_CONFLICT_SCHEMAS, USER_KEYBINDINGS_SCHEMA,
};
use keybind_overrider::core::{find_conflicts, parser::canonicalize, Registry};
use keybind_overrider::overrides::OverrideController;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LEDGER: &str = "~/.config/keybind-overrider/settings.json";

#[derive(Parser)]
#[command(name = "keybind-overrider")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RegistryArgs {
    /// User keybinding snapshot
    #[arg(short, long)]
    user: PathBuf,

    /// Conflict registry snapshots, in priority order (repeatable)
    #[arg(short, long, required = true)]
    foreign: Vec<PathBuf>,
}

#[derive(Args)]
struct EngineArgs {
    #[command(flatten)]
    registries: RegistryArgs,

    /// Settings file holding the override ledger
    #[arg(short, long, default_value = DEFAULT_LEDGER)]
    ledger: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical combo of each accelerator
    Canonicalize {
        /// Accelerator strings, e.g. "<Control><Alt>t"
        #[arg(required = true)]
        accelerators: Vec<String>,
    },

    /// List the bindings of a registry snapshot
    List {
        /// Registry snapshot file
        #[arg(short, long)]
        registry: PathBuf,
    },

    /// Check user bindings against conflict registries
    Check(RegistryArgs),

    /// Disable conflicting foreign bindings
    Override(EngineArgs),

    /// Restore every overridden binding
    Restore(EngineArgs),

    /// Refresh saved originals from the registries' current values
    Update(EngineArgs),

    /// Show the override ledger
    Status {
        /// Settings file holding the override ledger
        #[arg(short, long, default_value = DEFAULT_LEDGER)]
        ledger: PathBuf,
    },

    /// Override conflicts, then re-check whenever the user snapshot changes
    Watch {
        #[command(flatten)]
        engine: EngineArgs,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Canonicalize { accelerators } => canonicalize_accelerators(&accelerators),
        Commands::List { registry } => list_bindings(&registry)?,
        Commands::Check(args) => check_conflicts(&args)?,
        Commands::Override(args) => {
            let (controller, _) = build_controller(&args)?;
            controller.override_conflicts(None)?;
            print_ledger(&controller);
        }
        Commands::Restore(args) => {
            let (controller, _) = build_controller(&args)?;
            controller.restore_conflicts()?;
            let remaining = controller.saved_overrides().len();
            if remaining == 0 {
                println!("{} All overridden bindings restored", "✓".green());
            } else {
                println!(
                    "{} {} override{} kept (registry not available)",
                    "⚠".yellow(),
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
        }
        Commands::Update(args) => {
            let (controller, _) = build_controller(&args)?;
            controller.update_overrides()?;
            print_ledger(&controller);
        }
        Commands::Status { ledger } => show_status(&ledger)?,
        Commands::Watch { engine, interval_ms } => watch(&engine, interval_ms)?,
    }

    Ok(())
}

/// Installs the stderr log subscriber; `RUST_LOG` takes precedence
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands a leading `~` in a path
fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::tilde(
        path.to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
    );
    Ok(PathBuf::from(expanded.as_ref()))
}

fn open_registry(path: &Path) -> anyhow::Result<Rc<FileRegistry>> {
    let path = expand(path)?;
    let registry = FileRegistry::open(path.clone())
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
    Ok(Rc::new(registry))
}

type Registries = (Rc<FileRegistry>, Vec<Rc<FileRegistry>>);

fn open_registries(args: &RegistryArgs) -> anyhow::Result<Registries> {
    let user = open_registry(&args.user)?;
    let foreign = args
        .foreign
        .iter()
        .map(|path| open_registry(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if user.schema_id() != USER_KEYBINDINGS_SCHEMA {
        debug!(schema_id = user.schema_id(), "User snapshot uses a custom schema");
    }
    for registry in &foreign {
        if !DEFAULT_CONFLICT_SCHEMAS.contains(&registry.schema_id()) {
            debug!(schema_id = registry.schema_id(), "Conflict registry outside the default schema set");
        }
    }
    Ok((user, foreign))
}

fn as_dyn(registries: &[Rc<FileRegistry>]) -> Vec<Rc<dyn Registry>> {
    registries
        .iter()
        .map(|r| Rc::clone(r) as Rc<dyn Registry>)
        .collect()
}

fn build_controller(args: &EngineArgs) -> anyhow::Result<(Rc<OverrideController>, Registries)> {
    let (user, foreign) = open_registries(&args.registries)?;
    let store = Rc::new(FileStore::new(expand(&args.ledger)?));

    let controller = OverrideController::new(Rc::clone(&user) as Rc<dyn Registry>, as_dyn(&foreign), store);
    Ok((controller, (user, foreign)))
}

fn canonicalize_accelerators(accelerators: &[String]) {
    for accelerator in accelerators {
        let combo = canonicalize(accelerator);
        println!(
            "{} → {} {}",
            accelerator.cyan(),
            combo.to_string().bold(),
            format!("({})", combo.to_accelerator()).dimmed()
        );
    }
}

/// List all bindings in a registry snapshot
fn list_bindings(path: &Path) -> anyhow::Result<()> {
    let registry = open_registry(path)?;

    println!("{}", format!("Bindings from: {}\n", registry.schema_id()).bold());

    let bindings = registry.bindings();
    for binding in &bindings {
        if binding.is_disabled() {
            println!("{} → {}", binding.name.dimmed(), "disabled".dimmed());
            continue;
        }

        let combos = binding
            .accelerators
            .iter()
            .map(|a| canonicalize(a).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} → {} {}",
            binding.name.cyan().bold(),
            binding.accelerators.join(", ").green(),
            format!("[{}]", combos).dimmed()
        );
    }

    println!("\n{} Total: {} bindings", "✓".green(), bindings.len());

    Ok(())
}

/// Check user bindings against conflict registries
fn check_conflicts(args: &RegistryArgs) -> anyhow::Result<()> {
    let (user, foreign) = open_registries(args)?;

    println!(
        "{} Checking {} against {} registr{}",
        "→".cyan(),
        user.schema_id(),
        foreign.len(),
        if foreign.len() == 1 { "y" } else { "ies" }
    );

    let foreign = as_dyn(&foreign);
    let conflicts = find_conflicts(&*user, &foreign);

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} conflict{}:\n",
        "✗".red().bold(),
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" }
    );

    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("Conflict {}", i + 1).yellow().bold(),
            conflict.key_combo.to_accelerator().cyan(),
            format!("({})", conflict.key_combo).dimmed()
        );
        println!("  {} {}", "user:".dimmed(), conflict.user_binding);

        for (idx, name) in conflict.conflicting_bindings.iter().enumerate() {
            println!(
                "  {} {} → {}",
                format!("{}.", idx + 1).dimmed(),
                conflict.schema_id().magenta(),
                name
            );
        }
        println!();
    }

    println!("{}", "⚠ These foreign bindings will shadow your shortcuts!".yellow());
    std::process::exit(1);
}

fn print_ledger(controller: &OverrideController) {
    let ledger = controller.saved_overrides();
    if ledger.is_empty() {
        println!("{} No bindings overridden", "✓".green());
        return;
    }

    println!("{}", format!("{} binding(s) overridden:\n", ledger.len()).bold());
    for (name, entry) in &ledger {
        let saved = entry
            .accelerators()
            .map(|a| a.join(", "))
            .unwrap_or_else(|_| "<unreadable>".to_string());
        println!("  {} {} {}", entry.schema_id.magenta(), name.cyan(), format!("[{}]", saved).dimmed());
    }
}

fn show_status(ledger_path: &Path) -> anyhow::Result<()> {
    let store = Rc::new(FileStore::new(expand(ledger_path)?));
    let ledger = OverrideLedger::new(store).load();

    if ledger.is_empty() {
        println!("{} No bindings overridden", "✓".green());
        return Ok(());
    }

    println!("{}", format!("{} binding(s) overridden:\n", ledger.len()).bold());
    for (name, entry) in &ledger {
        println!("  {} {} {}", entry.schema_id.magenta(), name.cyan(), entry.bind.dimmed());
    }
    Ok(())
}

/// Runs an override pass, then follows edits to every snapshot
///
/// Conflict snapshots are reloaded before the user snapshot, so a pass
/// triggered by a user edit never writes back stale foreign state.
fn watch(args: &EngineArgs, interval_ms: u64) -> anyhow::Result<()> {
    let (controller, (user, foreign)) = build_controller(args)?;
    controller.enable();
    controller.override_conflicts(None)?;
    print_ledger(&controller);

    let user_watcher = FileWatcher::new(user.path())?;
    let foreign_watchers = foreign
        .iter()
        .map(|registry| Ok((Rc::clone(registry), FileWatcher::new(registry.path())?)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    println!("{} Watching {} (Ctrl-C to stop)", "→".cyan(), user.path().display());

    loop {
        let mut foreign_changed = false;
        for (registry, watcher) in &foreign_watchers {
            if !watcher.check_for_changes() {
                continue;
            }
            match registry.reload() {
                Ok(changed) if !changed.is_empty() => {
                    println!("{} {} changed: {}", "→".cyan(), registry.schema_id(), changed.join(", "));
                    foreign_changed = true;
                }
                Ok(_) => {}
                Err(e) => warn!(path = %registry.path().display(), error = %e, "Failed to reload conflict snapshot"),
            }
        }

        if foreign_changed {
            match controller.conflict_registry_changed() {
                Ok(()) => print_ledger(&controller),
                Err(e) => warn!(error = %e, "Failed to re-check conflicts"),
            }
        }

        if user_watcher.check_for_changes() {
            match user.reload() {
                Ok(changed) if !changed.is_empty() => {
                    println!("{} Changed: {}", "→".cyan(), changed.join(", "));
                    print_ledger(&controller);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to reload user snapshot"),
            }
        }
        thread::sleep(Duration::from_millis(interval_ms));
    }
}
