use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use output::{ListReport, Status, ThemeReport};
use pokedex_abilities::{
    AbilityList, CacheBackend, HttpAbilitySource, ListView, Settings, SnapshotStore,
    ThemeMode, ThemePreference,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod output;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse PokeAPI abilities through a cached show more / show less list", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Print a single JSON object instead of text (implies --quiet)
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the cached ability list and preferences
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Cache backend: file|memory
    #[arg(long, global = true)]
    cache_backend: Option<String>,

    /// REST API root (default: https://pokeapi.co/api/v2)
    #[arg(long, global = true)]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the abilities currently revealed (fetches the first page on a cold cache)
    List,

    /// Reveal the next page of abilities
    More,

    /// Hide the most recently revealed abilities
    Less,

    /// Drop everything and start again from the first page
    Refresh,

    /// Show or change the light/dark theme preference
    Theme(ThemeArgs),
}

#[derive(Args)]
struct ThemeArgs {
    /// New mode; omit to print the current one
    #[arg(value_enum)]
    mode: Option<ThemeArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    Toggle,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper chatter is only useful when asked for
    if !cli.verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let settings = resolve_settings(&cli)?;
    let store = settings.cache.open();
    log::debug!(
        "Using {} cache at {}",
        store.name(),
        settings.cache.dir.display()
    );

    match cli.command {
        Commands::Theme(args) => run_theme(args, store, cli.json).await,
        command => run_list(command, settings, store, cli.json).await,
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.apply_env().context("Invalid POKEDEX_* environment")?;

    if let Some(dir) = &cli.cache_dir {
        settings.cache.dir = dir.clone();
    }
    if let Some(backend) = &cli.cache_backend {
        settings.cache.backend = CacheBackend::parse(backend)?;
    }
    if let Some(base) = &cli.api_base {
        settings.list = settings.list.with_api_base(base.as_str());
    }
    settings.validate()?;
    Ok(settings)
}

async fn run_list(
    command: Commands,
    settings: Settings,
    store: Arc<dyn SnapshotStore>,
    json: bool,
) -> Result<()> {
    let list = AbilityList::new(HttpAbilitySource::new(), store, settings.list)?;

    let view = match command {
        Commands::Refresh => list.request_refresh().await,
        command => {
            let hydrated = list.request_hydrate().await;
            if hydrated.error.is_some() {
                hydrated
            } else {
                match command {
                    Commands::More => list.request_grow().await,
                    Commands::Less => list.request_shrink().await,
                    _ => hydrated,
                }
            }
        }
    };

    print_list(&view, json)?;
    if let Some(err) = view.error {
        anyhow::bail!("{err}");
    }
    Ok(())
}

fn print_list(view: &ListView, json: bool) -> Result<()> {
    let report = ListReport::new(view);
    if json {
        print_stdout(&serde_json::to_string_pretty(&report)?)
    } else {
        print_stdout(&output::render_list(&report))
    }
}

async fn run_theme(args: ThemeArgs, store: Arc<dyn SnapshotStore>, json: bool) -> Result<()> {
    let prefs = ThemePreference::new(store);
    let theme = match args.mode {
        None => prefs.load().await,
        Some(ThemeArg::Toggle) => prefs.toggle().await.context("Failed to store theme")?,
        Some(ThemeArg::Light) => save_theme(&prefs, ThemeMode::Light).await?,
        Some(ThemeArg::Dark) => save_theme(&prefs, ThemeMode::Dark).await?,
    };

    let report = ThemeReport {
        status: Status::Ok,
        theme,
    };
    if json {
        print_stdout(&serde_json::to_string_pretty(&report)?)
    } else {
        print_stdout(&output::render_theme(&report))
    }
}

async fn save_theme<C: SnapshotStore>(
    prefs: &ThemePreference<C>,
    mode: ThemeMode,
) -> Result<ThemeMode> {
    prefs.save(mode).await.context("Failed to store theme")?;
    Ok(mode)
}
