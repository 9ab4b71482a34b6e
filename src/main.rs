use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use medal_table::{
    build_medal_table, cumulative_points, CumulativeTrajectory, DataQualityEngine, EngineConfig,
    PipelineOutput, RankKey, RankingEngine, Season, Severity, SourcePaths, TrajectoryRequest,
};

/// Olympic medal tables: merge, rank and chart medal counts across editions
#[derive(Debug, Parser)]
#[command(name = "medal-table", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Historical medal CSV (one row per nation and edition)
    #[arg(long, global = true, env = "MEDAL_HISTORICAL", default_value = "data/historical.csv")]
    historical: PathBuf,

    /// Recent results: flat CSV or a workbook with one sheet per edition
    #[arg(long, global = true, env = "MEDAL_RECENT", default_value = "data/recent.xlsx")]
    recent: PathBuf,

    /// Host city/country JSON for sheet editions
    #[arg(long, global = true, env = "MEDAL_HOSTS")]
    hosts: Option<PathBuf>,

    /// Engine configuration JSON
    #[arg(long, global = true, env = "MEDAL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List editions with their hosts
    Editions {
        #[arg(long)]
        json: bool,
    },

    /// Ranked medal table for one edition
    Table {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        season: Season,

        /// official, points or total
        #[arg(long, default_value_t = RankKey::Official)]
        rank: RankKey,

        /// Show only the first N nations of the ranking
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Cumulative points per nation over a range of editions
    Trajectory {
        #[arg(long)]
        season: Season,

        #[arg(long)]
        from: i32,

        #[arg(long)]
        to: i32,

        /// Nation to include (repeatable); all nations when omitted
        #[arg(long = "nation")]
        nations: Vec<String>,

        /// Nation to drop after accumulation (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Data quality audit of the merged table
    Audit {
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("❌ {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let paths = SourcePaths {
        historical: cli.historical.clone(),
        recent: cli.recent.clone(),
        hosts: cli.hosts.clone(),
    };

    let output = build_medal_table(&paths, &config).context("failed to build medal table")?;

    match cli.command {
        Commands::Editions { json } => show_editions(&output, json),
        Commands::Table {
            year,
            season,
            rank,
            limit,
            json,
        } => show_table(&output, year, season, rank, limit, json),
        Commands::Trajectory {
            season,
            from,
            to,
            nations,
            exclude,
            json,
        } => {
            let registry = &output.registry;
            let request = TrajectoryRequest::new(season, from, to)
                .with_nations(nations.iter().map(|n| registry.canonical_name(n)))
                .excluding(exclude.iter().map(|n| registry.canonical_name(n)));
            let trajectory = cumulative_points(output.table.records(), &request)?;
            show_trajectory(&trajectory, json)
        }
        Commands::Audit { json } => run_audit(&output, &config, json),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MEDAL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn show_editions(output: &PipelineOutput, json: bool) -> Result<()> {
    let editions = output.table.editions();
    if json {
        return print_json(&editions);
    }

    println!("🏟️  {} editions", editions.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for edition in &editions {
        println!(
            "{:>4} {:<6}  {}, {} ({} nations)",
            edition.year, edition.season, edition.host_city, edition.host_country, edition.nations
        );
    }
    Ok(())
}

fn show_table(
    output: &PipelineOutput,
    year: i32,
    season: Season,
    rank: RankKey,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let records = output.table.edition(year, season);
    let view = RankingEngine::new().top(records, rank, limit);

    if json {
        return print_json(&view);
    }

    if view.is_empty() {
        println!("No results for {year} {season}");
        return Ok(());
    }

    if let Some(host) = output.table.host_of(year, season) {
        println!("🏅 {year} {season} Games - {}, {}", host.city, host.country);
    }
    println!("   ranked by {rank}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{:>4}  {:<4} {:<32} {:>4} {:>4} {:>4} {:>6} {:>6}",
        "#", "flag", "nation", "G", "S", "B", "total", "points"
    );
    for entry in &view {
        let r = entry.record;
        println!(
            "{:>4}  {:<4} {:<32} {:>4} {:>4} {:>4} {:>6} {:>6}",
            entry.rank, r.flag, r.nation, r.gold, r.silver, r.bronze, r.total, r.points
        );
    }
    Ok(())
}

fn show_trajectory(trajectory: &CumulativeTrajectory, json: bool) -> Result<()> {
    if json {
        return print_json(trajectory);
    }

    if trajectory.is_empty() {
        println!("No editions in range");
        return Ok(());
    }

    println!("📈 Cumulative points");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for row in trajectory.rows() {
        let values: Vec<String> = row
            .values
            .iter()
            .map(|v| format!("{}={}", v.nation, v.cumulative))
            .collect();
        println!("{}  {}", row.year, values.join(", "));
    }
    Ok(())
}

fn run_audit(output: &PipelineOutput, config: &EngineConfig, json: bool) -> Result<()> {
    let report = DataQualityEngine::with_host_placeholder(config.host_placeholder.clone())
        .audit(&output.table, &output.registry);

    if json {
        print_json(&report)?;
    } else {
        println!("🔍 {}", report.summary());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for issue in &report.issues {
            let marker = match issue.severity {
                Severity::Critical => "❌",
                Severity::Warning => "⚠️ ",
                Severity::Info => "ℹ️ ",
            };
            let nation = issue.nation.as_deref().unwrap_or("-");
            println!("{marker} [{}] {} {}: {}", issue.rule_name, issue.edition, nation, issue.issue);
            println!("     → {}", issue.recommendation);
        }
    }

    if report.has_critical_issues() {
        std::process::exit(2);
    }
    Ok(())
}
