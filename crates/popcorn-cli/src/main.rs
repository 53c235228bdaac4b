//! popcorn - media catalog browser CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use popcorn_api::catalog::{
    Anime, CatalogClient, CatalogEntry, DEFAULT_BASE_URL, LocalCatalogApi, Movie,
    RouteController, SearchParams, Show, SortBy, Tab,
};
use serde_json::Value;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{ApiConfig, AppConfig, resolve_config_path};

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("popcorn/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override the catalog API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Count the pages listed for a tab.
    Pages(PagesArgs),
    /// Search one page of a tab.
    Search(SearchArgs),
    /// Fetch a random entry of a tab.
    Random(RandomArgs),
    /// Fetch the full record of an entry by id.
    Get(GetArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `pages` subcommand.
#[derive(clap::Args)]
struct PagesArgs {
    /// Tab to query (show, anime, movie).
    #[arg(long, required = true)]
    tab: Tab,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Tab to query (show, anime, movie).
    #[arg(long, required = true)]
    tab: Tab,
    /// Page index.
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Sort key: name, rating, released, updated, trending, year.
    /// Other values are forwarded as-is.
    #[arg(long, default_value = "trending")]
    sort: SortBy,
    /// Sort order (-1 descending, 1 ascending).
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    order: i32,
    /// Genre filter.
    #[arg(long, default_value = "all")]
    genre: String,
    /// Search keywords.
    #[arg(long)]
    query: Option<String>,
}

/// Arguments for the `random` subcommand.
#[derive(clap::Args)]
struct RandomArgs {
    /// Tab to query (show, anime, movie).
    #[arg(long, required = true)]
    tab: Tab,
    /// Print the raw JSON record.
    #[arg(long)]
    raw: bool,
}

/// Arguments for the `get` subcommand.
#[derive(clap::Args)]
struct GetArgs {
    /// Tab to query (show, anime, movie).
    #[arg(long, required = true)]
    tab: Tab,
    /// Catalog id (e.g. "tt0944947").
    id: String,
    /// Print the raw JSON record.
    #[arg(long)]
    raw: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration.
    Show,
    /// Write a default config file.
    Init,
}

/// Builds the API client from the config file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the base URL is invalid,
/// or the client fails to build.
fn build_client(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<Arc<CatalogClient>> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    let mut builder = CatalogClient::builder()
        .base_url(config.api.resolve_base_url(base_url)?)
        .user_agent(USER_AGENT)
        .error_for_status(config.api.error_for_status);
    if let Some(timeout) = config.api.timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("failed to build API client")?;
    Ok(Arc::new(client))
}

/// Formats an optional value, or `-` when absent.
fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| String::from("-"), |v| v.to_string())
}

/// Logs entries as a table.
fn log_entries<T: CatalogEntry>(entries: &[T]) {
    tracing::info!("ID\t\tYear\tRating\tTitle");
    for entry in entries {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            entry.id().unwrap_or("-"),
            or_dash(entry.year()),
            or_dash(entry.rating().map(|r| r.percentage)),
            entry.title().unwrap_or("-"),
        );
    }
    tracing::info!("Total: {} entries", entries.len());
}

/// Logs the summary of a single entry.
fn log_entry<T: CatalogEntry>(entry: &T) {
    tracing::info!("ID:       {}", entry.id().unwrap_or("-"));
    tracing::info!("Title:    {}", entry.title().unwrap_or("-"));
    tracing::info!("Year:     {}", or_dash(entry.year()));
    tracing::info!(
        "Rating:   {}",
        or_dash(entry.rating().map(|r| format!("{}% ({} votes)", r.percentage, r.votes)))
    );
    let genres = entry.genres();
    if !genres.is_empty() {
        tracing::info!("Genres:   {}", genres.join(", "));
    }
    if let Some(synopsis) = entry.synopsis() {
        tracing::info!("Synopsis: {}", synopsis);
    }
}

/// Logs a raw JSON record.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
fn log_raw_record(record: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("failed to format JSON")?;
    tracing::info!("{}", json);
    Ok(())
}

/// Fetches a raw record: the detail record for `id`, or a random one.
///
/// # Errors
///
/// Returns an error if the API request fails.
async fn fetch_raw(api: &impl LocalCatalogApi, tab: Tab, id: Option<&str>) -> Result<Value> {
    let payload = match id {
        Some(id) => api.raw_details(tab, id).await,
        None => api.random(tab).await,
    }
    .context("failed to fetch record")?;
    Ok(payload.into_record())
}

/// Runs the `pages` subcommand for one entry type.
///
/// # Errors
///
/// Returns an error if the API request fails.
async fn pages_of<T: CatalogEntry>(route: RouteController<T>) -> Result<()> {
    let pages = route.pages().await.context("failed to fetch pages")?;
    tracing::info!("Pages: {}", pages);
    Ok(())
}

/// Runs the `search` subcommand for one entry type.
///
/// # Errors
///
/// Returns an error if the API request fails.
async fn search_in<T: CatalogEntry>(route: RouteController<T>, params: &SearchParams) -> Result<()> {
    let entries = route.search(params).await.context("failed to search")?;
    log_entries(&entries);
    Ok(())
}

/// Runs the `random` subcommand for one entry type.
///
/// # Errors
///
/// Returns an error if the API request fails.
async fn random_in<T: CatalogEntry>(route: RouteController<T>) -> Result<()> {
    let entry = route.random().await.context("failed to fetch random entry")?;
    log_entry(&entry);
    Ok(())
}

/// Runs the `get` subcommand for one entry type.
///
/// # Errors
///
/// Returns an error if the API request fails.
async fn get_in<T: CatalogEntry>(route: RouteController<T>, id: &str) -> Result<()> {
    let entry = route.get(id).await.context("failed to fetch entry")?;
    log_entry(&entry);
    Ok(())
}

/// Runs the `pages` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_pages(client: Arc<CatalogClient>, args: &PagesArgs) -> Result<()> {
    match args.tab {
        Tab::Show => pages_of(RouteController::<Show>::for_entry(client)).await,
        Tab::Anime => pages_of(RouteController::<Anime>::for_entry(client)).await,
        Tab::Movie => pages_of(RouteController::<Movie>::for_entry(client)).await,
    }
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_search(client: Arc<CatalogClient>, args: &SearchArgs) -> Result<()> {
    let mut params = SearchParams::new()
        .page(args.page)
        .sort(args.sort.clone())
        .order(args.order)
        .genre(args.genre.clone());
    params.query.clone_from(&args.query);

    match args.tab {
        Tab::Show => search_in(RouteController::<Show>::for_entry(client), &params).await,
        Tab::Anime => search_in(RouteController::<Anime>::for_entry(client), &params).await,
        Tab::Movie => search_in(RouteController::<Movie>::for_entry(client), &params).await,
    }
}

/// Runs the `random` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_random(client: Arc<CatalogClient>, args: &RandomArgs) -> Result<()> {
    if args.raw {
        let record = fetch_raw(client.as_ref(), args.tab, None).await?;
        return log_raw_record(&record);
    }
    match args.tab {
        Tab::Show => random_in(RouteController::<Show>::for_entry(client)).await,
        Tab::Anime => random_in(RouteController::<Anime>::for_entry(client)).await,
        Tab::Movie => random_in(RouteController::<Movie>::for_entry(client)).await,
    }
}

/// Runs the `get` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_get(client: Arc<CatalogClient>, args: &GetArgs) -> Result<()> {
    if args.raw {
        let record = fetch_raw(client.as_ref(), args.tab, Some(&args.id)).await?;
        return log_raw_record(&record);
    }
    match args.tab {
        Tab::Show => get_in(RouteController::<Show>::for_entry(client), &args.id).await,
        Tab::Anime => get_in(RouteController::<Anime>::for_entry(client), &args.id).await,
        Tab::Movie => get_in(RouteController::<Movie>::for_entry(client), &args.id).await,
    }
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or serialized.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let effective = config.api.resolve_base_url(base_url)?;

    tracing::info!("Config file: {}", config_path.display());
    tracing::info!("Base URL:    {}", effective);
    tracing::info!("{}", config.to_toml()?);
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
#[instrument(skip_all)]
fn run_config_init(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() {
        bail!("config file already exists: {}", config_path.display());
    }

    let config = AppConfig {
        api: ApiConfig {
            base_url: Some(String::from(DEFAULT_BASE_URL)),
            ..ApiConfig::default()
        },
    };
    config.save(&config_path).context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    let base_url = cli.base_url.as_deref();
    match cli.command {
        Commands::Pages(args) => run_pages(build_client(dir, base_url)?, &args).await,
        Commands::Search(args) => run_search(build_client(dir, base_url)?, &args).await,
        Commands::Random(args) => run_random(build_client(dir, base_url)?, &args).await,
        Commands::Get(args) => run_get(build_client(dir, base_url)?, &args).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Show => run_config_show(dir, base_url),
            ConfigSubcommands::Init => run_config_init(dir),
        },
    }
}
