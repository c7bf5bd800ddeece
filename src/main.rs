use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use fetch::FetchContext;
use log::{info, warn};
use scraper::Html;
use url::Url;

use sbads::brand::{map_table, BrandMap, MappingSummary};
use sbads::config::Config;
use sbads::csv::{self, CsvTable};
use sbads::extract::TableStats;
use sbads::page::Page;
use sbads::{extract, logger};

/// picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG: &str = "sbads.toml";

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML file overriding the default url, paths and http settings
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// more output, repeat for trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull the commercial tables out of the article into a CSV
    Extract(ExtractArgs),
    /// Attribute extracted commercials to known brands
    Map(MapArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// article to fetch instead of the configured one
    #[arg(long, value_parser = Url::parse, value_name = "URL")]
    url: Option<Url>,

    /// saved copy of the article
    #[arg(short, long, value_name = "HTML_FILE", conflicts_with = "url")]
    input: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// never touch the network, only the cache and local files
    #[arg(long)]
    offline: bool,

    /// keep responses in memory only
    #[arg(long)]
    no_cache: bool,

    /// drop the cached copy before fetching
    #[arg(long, conflicts_with = "offline")]
    refresh: bool,
}

#[derive(Args)]
struct MapArgs {
    /// extracted commercials
    #[arg(long, value_name = "FILE")]
    commercials: Option<PathBuf>,

    /// reference table with a `BrandName` column
    #[arg(long, value_name = "FILE")]
    brands: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet)?;
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Extract(args) => run_extract(&cfg, args),
        Command::Map(args) => run_map(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => Config::load(DEFAULT_CONFIG)?,
        None => Config::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display())),
        _ => Ok(()),
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    create_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn source_url(cfg: &Config, args: &ExtractArgs) -> Result<Url> {
    if let Some(input) = &args.input {
        let path = std::fs::canonicalize(input)
            .with_context(|| format!("failed to open {}", input.display()))?;
        return Url::from_file_path(&path)
            .map_err(|()| anyhow!("{} is not a valid file path", path.display()));
    }
    Ok(args.url.clone().unwrap_or_else(|| cfg.url.clone()))
}

fn fetch_context(cfg: &Config, args: &ExtractArgs) -> Result<FetchContext> {
    let conn = if args.no_cache {
        rusqlite::Connection::open_in_memory()?
    } else {
        create_parent(&cfg.cache)?;
        rusqlite::Connection::open(&cfg.cache)
            .with_context(|| format!("failed to open cache {}", cfg.cache.display()))?
    };
    let agent = ureq::AgentBuilder::new()
        .user_agent(&cfg.user_agent)
        .timeout(cfg.timeout())
        .build();
    Ok(FetchContext::new_cfg(conn, agent, args.offline)?)
}

fn run_extract(cfg: &Config, args: ExtractArgs) -> Result<()> {
    let url = source_url(cfg, &args)?;
    let ctx = fetch_context(cfg, &args)?;
    if args.refresh && ctx.invalidate(&url)? {
        info!("dropped cached copy of {url}");
    }

    let (ty, body) = ctx.fetch(&url)?;
    if !ty.is_markup() {
        bail!("{url} is {}, not a web page", ty.mime());
    }
    let html = Html::parse_document(&String::from_utf8_lossy(&body));
    drop(body);
    let elements = Page::new()
        .elements(&html)
        .with_context(|| format!("{url} does not look like a wikipedia article"))?;

    let extraction = extract(elements);
    let stats = extraction.stats;
    let records = match extraction.into_records() {
        Ok(records) => records,
        Err(e) => {
            warn!("{e}; nothing to save");
            return Ok(());
        }
    };

    let output = args.output.as_deref().unwrap_or(&cfg.commercials);
    let mut w = create_file(output)?;
    csv::write_records(&mut w, &records)?;
    w.flush()?;

    print_extract_report(records.len(), &stats, output);
    Ok(())
}

fn print_extract_report(records: usize, stats: &TableStats, output: &Path) {
    println!("Extracted {records} commercials to {}", output.display());
    println!("Tables seen:     {}", stats.seen);
    println!("Tables accepted: {}", stats.accepted);
    println!(
        "Tables skipped:  {} ({} unmarked, {} without year, {} failed)",
        stats.skipped(),
        stats.unmarked,
        stats.without_year,
        stats.failed
    );
}

fn read_table(path: &Path) -> Result<CsvTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CsvTable::parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn run_map(cfg: &Config, args: MapArgs) -> Result<()> {
    let brands_path = args.brands.as_deref().unwrap_or(&cfg.brands);
    let brands = BrandMap::from_table(&read_table(brands_path)?)
        .with_context(|| format!("in {}", brands_path.display()))?;
    info!("prepared {} unique brands for matching", brands.len());

    let commercials_path = args.commercials.as_deref().unwrap_or(&cfg.commercials);
    let commercials = read_table(commercials_path)?;
    let (mapped, summary) = map_table(&commercials, &brands)
        .with_context(|| format!("in {}", commercials_path.display()))?;

    let output = args.output.as_deref().unwrap_or(&cfg.mapped);
    let mut w = create_file(output)?;
    mapped.write_to(&mut w)?;
    w.flush()?;
    info!("wrote {}", output.display());

    print_map_report(&summary);
    Ok(())
}

fn print_map_report(summary: &MappingSummary) {
    println!("Total commercials: {}", summary.total);
    println!(
        "Mapped to primary advertiser: {} ({:.1}%)",
        summary.mapped,
        summary.percent_mapped()
    );
    println!("Could not be mapped:          {}", summary.unmapped);

    if !summary.top_mapped.is_empty() {
        println!("\nTop {} mapped advertisers:", summary.top_mapped.len());
        for (name, count) in &summary.top_mapped {
            println!("{count:>6}  {name}");
        }
    }
    if !summary.top_unmapped.is_empty() {
        println!("\nTop {} unmapped advertiser/product entries:", summary.top_unmapped.len());
        for (text, count) in &summary.top_unmapped {
            println!("{count:>6}  {text}");
        }
    }
}
