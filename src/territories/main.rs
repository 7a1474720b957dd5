//! Tier territory pipeline.
//!
//! Loads the boundary hierarchy and geocoded teams, locates every team,
//! partitions each tier among its leagues and writes one GeoJSON file per
//! tier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use catchment::io::output::{write_summary, write_team_regions, write_tier, TierSummary};
use catchment::io::{load_store, load_teams};
use catchment::locate::PointLocator;
use catchment::models::Tier;
use catchment::region::Hierarchy;
use catchment::territory::{TerritoryService, TierTerritories};
use catchment::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "territories")]
#[command(about = "Partition league territories per tier over a region hierarchy")]
struct Args {
    /// Configuration file (levels, entry rules, tiers)
    #[arg(short, long, default_value = "catchment.toml")]
    config: PathBuf,

    /// Directory of geocoded team JSON files
    #[arg(short, long)]
    teams: PathBuf,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only compute these tiers (by name)
    #[arg(long, num_args = 1..)]
    tiers: Vec<String>,

    /// Compute tiers in parallel
    #[arg(long)]
    parallel: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Catchment territories");
    info!("Config: {}", args.config.display());

    let config = Config::load_from_file(&args.config)?;

    // Boundaries and hierarchy
    let store = load_store(&config).context("Failed to load boundary datasets")?;
    if store.is_empty() {
        anyhow::bail!("No boundary regions loaded");
    }
    let hierarchy = Hierarchy::build(&store);
    for (level, layer) in store.levels() {
        let links = hierarchy.link_stats(level);
        if links.orphaned > 0 {
            warn!(
                "Level '{}': {} regions have no parent and are unreachable from the root",
                layer.name, links.orphaned
            );
        }
    }

    // Teams
    let matcher = config.tier_matcher()?;
    let roster = load_teams(&args.teams, &matcher)
        .with_context(|| format!("Failed to load teams from {}", args.teams.display()))?;

    // One location pass serves every tier
    let placement = PointLocator::new(&store, &hierarchy).locate_all(&roster.teams);

    let entry = config.entry_policy(&store)?;
    let service = TerritoryService::new(&store, &hierarchy, entry, config.merge_options());

    let tiers = selected_tiers(matcher.tiers(), &args.tiers);
    let tiers: Vec<Tier> = tiers
        .into_iter()
        .filter(|tier| {
            let present = roster.of_tier(tier).next().is_some();
            if !present {
                info!("{}: no teams, skipping", tier);
            }
            present
        })
        .collect();

    let pb = ProgressBar::new(tiers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let compute = |tier: &Tier| -> TierTerritories {
        pb.set_message(tier.name.clone());
        let result = service.tier_territories(tier, &roster.teams, &placement.index);
        pb.inc(1);
        result
    };
    let results: Vec<TierTerritories> = if args.parallel {
        tiers.par_iter().map(compute).collect()
    } else {
        tiers.iter().map(compute).collect()
    };
    pb.finish_and_clear();

    // Outputs
    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let mut summaries = Vec::with_capacity(results.len());
    for result in &results {
        let path = write_tier(&output_dir, result)?;
        info!(
            "{}: {} leagues (entry {}, {} owned, {} fallback, {} tessellated, {} skipped, {} teams above entry) -> {}",
            result.tier,
            result.territories.len(),
            result.entry,
            result.stats.owned,
            result.stats.fallback,
            result.stats.tessellated,
            result.stats.skipped + result.merge_skipped,
            result.stats.unplaced_at_entry,
            path.display()
        );
        summaries.push(TierSummary::new(result, &store));
    }

    write_team_regions(&output_dir.join("team_regions.json"), &roster.teams, &placement, &store)?;
    write_summary(&output_dir.join("summary.json"), &summaries)?;

    info!(
        "Done: {} tiers written to {} ({} teams outside every region)",
        results.len(),
        output_dir.display(),
        placement.stats.unplaced
    );
    Ok(())
}

/// Keep the configured tiers named on the command line, all when none are named.
fn selected_tiers(configured: Vec<Tier>, requested: &[String]) -> Vec<Tier> {
    if requested.is_empty() {
        return configured;
    }
    for name in requested {
        if !configured.iter().any(|tier| &tier.name == name) {
            warn!("Unknown tier '{}'", name);
        }
    }
    configured
        .into_iter()
        .filter(|tier| requested.contains(&tier.name))
        .collect()
}
