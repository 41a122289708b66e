//! OrderTrends CLI
//!
//! Command-line interface for the OrderTrends analytics backend.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ordertrends::api::{AppState, HttpServer};
use ordertrends::cache::build_cache;
use ordertrends::config::LoggingConfig;
use ordertrends::dataset::Dataset;
use ordertrends::directory::{self, RestaurantPage, RestaurantParams, RestaurantQuery};
use ordertrends::engine::{TimeNormalizer, TrendEngine};
use ordertrends::models::{TrendParams, TrendQuery, TrendResult};
use ordertrends::Config;

/// OrderTrends - Restaurant order analytics
#[derive(Parser)]
#[command(name = "ordertrends")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ORDERTRENDS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// HTTP API port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute daily trends and top restaurants
    Trends(TrendArgs),

    /// Search the restaurant directory
    Restaurants(RestaurantArgs),
}

#[derive(Args)]
struct TrendArgs {
    /// Only orders for this restaurant
    #[arg(long)]
    restaurant_id: Option<String>,

    /// First day (YYYY-MM-DD), defaults to the earliest order
    #[arg(long)]
    start_date: Option<String>,

    /// Last day (YYYY-MM-DD), defaults to the latest order
    #[arg(long)]
    end_date: Option<String>,

    /// Minimum order amount
    #[arg(long)]
    amount_min: Option<String>,

    /// Maximum order amount
    #[arg(long)]
    amount_max: Option<String>,

    /// First hour of day (0-23)
    #[arg(long)]
    hour_min: Option<String>,

    /// Last hour of day (0-23)
    #[arg(long)]
    hour_max: Option<String>,
}

impl From<TrendArgs> for TrendParams {
    fn from(args: TrendArgs) -> Self {
        Self {
            restaurant_id: args.restaurant_id,
            start_date: args.start_date,
            end_date: args.end_date,
            amount_min: args.amount_min,
            amount_max: args.amount_max,
            hour_min: args.hour_min,
            hour_max: args.hour_max,
        }
    }
}

#[derive(Args)]
struct RestaurantArgs {
    /// Free-text search over name, cuisine and location
    #[arg(long)]
    q: Option<String>,

    /// Exact cuisine
    #[arg(long)]
    cuisine: Option<String>,

    /// Exact location
    #[arg(long)]
    location: Option<String>,

    /// Sort by (name, location, cuisine)
    #[arg(long)]
    sort: Option<String>,

    /// Page number
    #[arg(long)]
    page: Option<String>,

    /// Page size
    #[arg(long)]
    limit: Option<String>,
}

impl From<RestaurantArgs> for RestaurantParams {
    fn from(args: RestaurantArgs) -> Self {
        Self {
            q: args.q,
            cuisine: args.cuisine,
            location: args.location,
            sort: args.sort,
            page: args.page,
            limit: args.limit,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Trends(args) => run_trends(&config, args, cli.format),
        Commands::Restaurants(args) => run_restaurants(&config, args, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so `--format json` output stays parseable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_engine(config: &Config) -> anyhow::Result<TrendEngine> {
    let normalizer = TimeNormalizer::from_name(&config.engine.timezone)?;
    let dataset = Dataset::load(&config.data, &normalizer)?;
    Ok(TrendEngine::new(Arc::new(dataset), normalizer))
}

async fn run_serve(config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let engine = load_engine(&config)?;
    let cache = build_cache(&config).await?;

    let addr = format!(
        "{}:{}",
        host.unwrap_or_else(|| config.server.host.clone()),
        port.unwrap_or(config.server.http_port)
    );

    info!(
        "Starting OrderTrends API on {} (cache ttl {:?})",
        addr, config.cache.ttl
    );

    let server = HttpServer::new(AppState {
        engine: Arc::new(engine),
        cache,
        cache_ttl: config.cache.ttl,
    });
    server.serve(&addr).await?;

    Ok(())
}

fn run_trends(config: &Config, args: TrendArgs, format: OutputFormat) -> anyhow::Result<()> {
    let engine = load_engine(config)?;
    let query = TrendQuery::parse(&args.into())?;
    let result = engine.compute(&query)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_trends(&result, engine.dataset()),
    }
    Ok(())
}

fn run_restaurants(config: &Config, args: RestaurantArgs, format: OutputFormat) -> anyhow::Result<()> {
    let engine = load_engine(config)?;
    let query = RestaurantQuery::parse(&args.into())?;
    let page = directory::search(engine.dataset().restaurants(), &query);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Text => print_restaurants(&page),
    }
    Ok(())
}

fn print_trends(result: &TrendResult, dataset: &Dataset) {
    println!("{}", style("Daily trends").bold());
    println!(
        "{:<12} {:>7} {:>12} {:>10} {:>5}",
        "DATE", "ORDERS", "REVENUE", "AVG", "PEAK"
    );
    for row in &result.daily {
        let peak = row
            .peak_order_hour
            .map_or_else(|| "-".to_string(), |h| format!("{h:02}h"));
        println!(
            "{:<12} {:>7} {:>12.2} {:>10.2} {:>5}",
            row.date, row.orders, row.revenue, row.avg_order_value, peak
        );
    }
    if result.daily.is_empty() {
        println!("{}", style("(no matching orders)").dim());
    }

    println!();
    println!("{}", style("Top restaurants").bold());
    for (rank, entry) in result.top3.iter().enumerate() {
        let name = dataset
            .restaurant(entry.restaurant_id)
            .map_or("unknown", |r| r.name.as_str());
        println!(
            "{}. {:<28} #{:<6} {:>12.2}",
            rank + 1,
            name,
            entry.restaurant_id,
            entry.revenue
        );
    }
}

fn print_restaurants(page: &RestaurantPage) {
    println!(
        "{:<6} {:<28} {:<18} {:<16}",
        style("ID").bold(),
        style("NAME").bold(),
        style("CUISINE").bold(),
        style("LOCATION").bold()
    );
    for r in &page.data {
        println!("{:<6} {:<28} {:<18} {:<16}", r.id, r.name, r.cuisine, r.location);
    }
    println!(
        "{}",
        style(format!(
            "page {} ({} per page), {} matching",
            page.page, page.limit, page.total
        ))
        .dim()
    );
}
