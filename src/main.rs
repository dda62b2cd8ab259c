mod logger;

use anyhow::{Context, Result};
use bus::{Bus, HostEvent};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineConfig};
use html::{Document, Effect};
use runtime_page::{PageRuntime, forward_store_changes};
use settings::{JsonFileStore, Preferences, Registry, SettingsStore, SettingsSync};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "sdlens", version)]
#[command(about = "Reconcile Sanskrit dictionary search pages with reader preferences")]
struct Cli {
    /// Diagnostic logging on stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a saved search page and print the result.
    Reconcile(ReconcileArgs),
    /// Print the default preferences as JSON.
    Defaults,
    /// List the built-in dictionaries by category.
    Registry,
}

#[derive(Args)]
struct ReconcileArgs {
    page: PathBuf,
    /// JSON preferences file, used as the settings store.
    #[arg(long)]
    prefs: Option<PathBuf>,
    /// Engine configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON list of host events replayed after the page load.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile(args) => reconcile(&args, cli.debug),
        Commands::Defaults => {
            logger::init(cli.debug);
            let prefs = Preferences::defaults(&Registry::builtin());
            println!("{}", serde_json::to_string_pretty(&prefs.to_raw())?);
            Ok(())
        }
        Commands::Registry => {
            logger::init(cli.debug);
            print!("{}", registry_listing(&Registry::builtin()));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn load_script(path: &Path) -> Result<Vec<HostEvent>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid script {}", path.display()))
}

fn reconcile(args: &ReconcileArgs, debug: bool) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    logger::init(debug || config.debug);

    let markup = fs::read_to_string(&args.page)
        .with_context(|| format!("failed to read page {}", args.page.display()))?;
    if !html::looks_like_markup(&markup) {
        log::warn!(target: "sdlens", "{} does not look like markup", args.page.display());
    }
    let mut events = vec![HostEvent::Load];
    if let Some(script) = &args.script {
        events.extend(load_script(script)?);
    }
    events.push(HostEvent::Shutdown);

    let store: Option<Arc<dyn SettingsStore>> = args
        .prefs
        .as_ref()
        .map(|path| Arc::new(JsonFileStore::new(config.store_area, path)) as Arc<dyn SettingsStore>);
    let bus = Bus::new();
    if let Some(store) = &store {
        forward_store_changes(store.as_ref(), bus.host_tx.clone());
    }
    let settings = SettingsSync::new(Registry::builtin(), store);
    let mut runtime = PageRuntime::new(Document::parse(&markup), Engine::new(config), settings);

    for event in events {
        bus.host_tx.send(event)?;
    }
    runtime.run(&bus.host_rx);
    log::info!(target: "sdlens", "{} reconciliation run(s)", runtime.runs());

    let effects = runtime.take_effects();
    let doc = runtime.into_document();
    println!("{}", doc.inner_html(doc.root())?);
    for effect in &effects {
        eprintln!("{}", describe_effect(&doc, effect));
    }
    Ok(())
}

fn describe_effect(doc: &Document, effect: &Effect) -> String {
    match effect {
        Effect::Submit { form, via } => {
            let action = doc.attr(*form, "action").unwrap_or("");
            format!("submit form action={action:?} via {via:?}")
        }
        Effect::Dispatch { target, event } => {
            let name = doc.tag_name(*target).unwrap_or("?");
            format!("dispatch {event:?} on <{name}>")
        }
    }
}

fn registry_listing(registry: &Registry) -> String {
    let mut out = String::new();
    for (category, entries) in registry.categories() {
        out.push_str(category);
        out.push('\n');
        for entry in entries {
            out.push_str(&format!("  {:<8} {}\n", entry.code, entry.label));
        }
    }
    out
}
