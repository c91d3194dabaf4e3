mod catalog;
mod config;
mod insert;
mod output;
mod parse;
mod prompt;
mod simulate;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rankshelf_core::{Category, EngineConfig, Prediction, RankingEngine, next_pair};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::catalog::{Catalog, load_catalog};
use crate::config::RankshelfConfig;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "rankshelf", version, about = "Rank a personal catalog from pairwise preferences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: ~/.config/rankshelf/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fit strengths from recorded comparisons and print the ranking
    Rank(RankArgs),
    /// Suggest the next pair of items to compare
    NextPair(NextPairArgs),
    /// Rate a new item by answering a short series of questions
    Insert(InsertArgs),
    /// Predict scores for items that were never compared
    Predict(PredictArgs),
    /// Measure how well suggested comparisons recover a hidden order
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/rankshelf/config.toml
    Init,
}

#[derive(Parser)]
struct RankArgs {
    /// Catalog JSON file ("-" reads stdin)
    #[arg(long, default_value = "-")]
    catalog: PathBuf,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct NextPairArgs {
    #[arg(long, default_value = "-")]
    catalog: PathBuf,

    /// Item to leave out of the suggestion (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Random seed for reproducible suggestions
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct InsertArgs {
    #[arg(long, default_value = "-")]
    catalog: PathBuf,

    /// ID of the item being rated
    #[arg(long)]
    item: String,

    /// movie, show, book or podcast. Defaults to the item's category in the catalog.
    #[arg(long)]
    category: Option<Category>,

    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct PredictArgs {
    #[arg(long, default_value = "-")]
    catalog: PathBuf,

    /// Predict a single candidate instead of the whole candidate pool
    #[arg(long)]
    candidate: Option<String>,

    /// Share of the fitted strength in the blend (0-1)
    #[arg(long)]
    alpha: Option<f64>,

    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of items with hidden strengths
    #[arg(long, default_value_t = 20)]
    items: usize,

    /// Number of suggested comparisons to play
    #[arg(long, default_value_t = 200)]
    rounds: usize,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        bail(format!("{e:#}"));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };

    match cli.command {
        Commands::Init => run_init(&config_path),
        Commands::Rank(args) => run_rank(args, &load_config(&config_path)?),
        Commands::NextPair(args) => run_next_pair(args, &load_config(&config_path)?),
        Commands::Insert(args) => run_insert(args),
        Commands::Predict(args) => run_predict(args, &load_config(&config_path)?),
        Commands::Simulate(args) => run_simulate(args, &load_config(&config_path)?),
    }
}

fn load_config(path: &Path) -> Result<RankshelfConfig> {
    let cfg = config::load_config(path)?;
    debug!(path = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}

fn run_init(path: &Path) -> Result<()> {
    config::create_default_config(path)?;
    println!("Created config at {}", path.display());
    println!("Edit it to tune fitting, pair suggestions and predictions.");
    Ok(())
}

/// Seed from the CLI, then the config file, else from the OS.
fn make_rng(seed: Option<u64>, cfg: &RankshelfConfig) -> StdRng {
    match seed.or(cfg.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Engine over the catalog's items with its comparisons recorded and fitted.
fn fitted_engine(catalog: &Catalog, config: EngineConfig) -> RankingEngine {
    let mut engine = RankingEngine::new(&catalog.item_ids(), config);
    engine.record_comparisons(&catalog.comparisons);
    engine.refit();
    engine
}

fn run_rank(args: RankArgs, cfg: &RankshelfConfig) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    if catalog.items.is_empty() {
        anyhow::bail!("Catalog has no items to rank");
    }

    let engine = fitted_engine(&catalog, cfg.engine_config());
    let report = engine.last_fit().context("No fit available after refit")?;

    if args.json {
        output::print_json(&engine, report)
    } else {
        output::print_table(&engine, report);
        Ok(())
    }
}

fn run_next_pair(args: NextPairArgs, cfg: &RankshelfConfig) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let engine = fitted_engine(&catalog, cfg.engine_config());
    let blocklist: HashSet<String> = args.exclude.into_iter().collect();
    let mut rng = make_rng(args.seed, cfg);

    // Caller-kept history wins over history derived from the comparisons.
    let pair = if catalog.history.is_empty() {
        engine.suggest_pair(&blocklist, &mut rng)
    } else {
        next_pair(
            engine.item_ids(),
            engine.strength_map(),
            &catalog.history,
            &blocklist,
            &engine.config().selector,
            &mut rng,
        )
    };

    output::print_pair(pair.as_ref(), args.json)
}

fn run_insert(args: InsertArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let category = args
        .category
        .or_else(|| catalog.items.iter().find(|i| i.id == args.item).and_then(|i| i.category))
        .with_context(|| format!("No category for \"{}\". Pass --category", args.item))?;

    let existing = catalog.rated_in(category, &args.item);
    debug!(item = %args.item, %category, existing = existing.len(), "starting insertion");

    let stdin = io::stdin();
    let session = insert::run_insertion(&args.item, category, existing, &mut stdin.lock(), &mut io::stderr())?;
    output::print_insertion(&args.item, &session, args.json)
}

fn run_predict(args: PredictArgs, cfg: &RankshelfConfig) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let mut config = cfg.engine_config();
    if let Some(alpha) = args.alpha {
        config.prediction.alpha = alpha;
    }

    let engine = fitted_engine(&catalog, config);
    let features = catalog.feature_map();

    let predictions = match args.candidate {
        Some(candidate) => {
            let score = engine.predict(&candidate, &features, &catalog.liked);
            vec![Prediction { item: candidate, score }]
        }
        None => {
            let candidates = catalog.candidate_ids();
            if candidates.is_empty() {
                anyhow::bail!("Catalog has no candidates. Pass --candidate <id> or add a \"candidates\" array");
            }
            engine.rank_candidates(&candidates, &features, &catalog.liked)
        }
    };

    output::print_predictions(&predictions, args.json)
}

fn run_simulate(args: SimulateArgs, cfg: &RankshelfConfig) -> Result<()> {
    let mut rng = make_rng(args.seed, cfg);
    let report = simulate::run_simulation(args.items, args.rounds, cfg.engine_config(), &mut rng)?;
    simulate::print_report(&report, args.json)
}
