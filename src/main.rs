use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use activity_digest::timeline::TimeUnit;
use activity_digest::{charts, export, grouping, normalize, profile, report, stats, timeline};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "activity-digest")]
#[command(about = "Activity timelines, repository rollups and chart series", long_about = None)]
struct Cli {
    /// Profile JSON file; falls back to ACTIVITY_PROFILE
    #[arg(long, global = true)]
    profile: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List activity grouped by week or month, newest first
    Timeline {
        #[arg(long, value_enum, default_value_t = TimeUnit::Month)]
        unit: TimeUnit,
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
    /// List repositories by contribution count
    Repos {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Roll repositories up by organization
        #[arg(long)]
        by_org: bool,
    },
    /// Write monthly chart series as CSV
    Chart {
        /// Break code activity down per repository
        #[arg(long)]
        stacked: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print profile totals and upcoming events
    Summary,
    /// Generate a markdown digest
    Report {
        #[arg(long, default_value = "digest.md")]
        out: PathBuf,
    },
    /// Write every derived view as JSON
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn profile_path(cli_value: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match cli_value {
        Some(path) => Ok(path),
        None => std::env::var("ACTIVITY_PROFILE")
            .map(PathBuf::from)
            .context("pass --profile or set ACTIVITY_PROFILE to a profile JSON file"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("activity_digest=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let path = profile_path(cli.profile)?;
    let profile = profile::load_profile(&path)?;
    let items = normalize::normalize_profile(&profile)
        .with_context(|| format!("failed to normalize {}", path.display()))?;
    info!(items = items.len(), "normalized activity");

    match cli.command {
        Commands::Timeline { unit, limit } => {
            let buckets = timeline::group_by_time_unit(&items, unit);
            if buckets.is_empty() {
                println!("No activity found in this profile.");
                return Ok(());
            }

            for bucket in buckets.iter().take(limit) {
                let label = match unit {
                    TimeUnit::Week => format!("Week of {}", bucket.anchor.format("%Y-%m-%d")),
                    TimeUnit::Month => bucket.anchor.format("%B %Y").to_string(),
                };
                println!("{} ({} items)", label, bucket.items.len());
                for item in &bucket.items {
                    println!(
                        "- {} [{}] {}",
                        item.timestamp.format("%Y-%m-%d"),
                        item.kind,
                        item.title
                    );
                }
            }
        }
        Commands::Repos { limit, by_org } => {
            let repositories = grouping::group_by_repository(&items);
            if repositories.is_empty() {
                println!("No repository activity found.");
                return Ok(());
            }

            if by_org {
                for org in grouping::group_by_organization(&repositories).iter().take(limit) {
                    println!("{} ({} repositories)", org.org_name, org.repositories.len());
                    for repo in &org.repositories {
                        println!("- {} ({} contributions)", repo.full_name, repo.items.len());
                    }
                }
            } else {
                println!("Top repositories by contributions:");
                for repo in repositories.iter().take(limit) {
                    println!(
                        "- {} ({}) {} contributions",
                        repo.full_name,
                        repo.url,
                        repo.items.len()
                    );
                }
            }
        }
        Commands::Chart { stacked, out } => {
            let writer: Box<dyn io::Write> = match &out {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };

            if stacked {
                export::write_stacked_csv(writer, &charts::stacked_monthly_activity(&items))?;
            } else {
                export::write_monthly_csv(writer, &charts::monthly_activity_counts(&items))?;
            }
            if let Some(path) = out {
                info!("chart series written to {}", path.display());
            }
        }
        Commands::Summary => {
            let summary = stats::summarize_profile(&profile);
            println!("Articles: {}", summary.total_articles);
            println!(
                "GitHub: {} repositories, {} stars, {} contributions",
                summary.repositories, summary.total_stars, summary.total_contributions
            );
            println!(
                "Events: {} ({} as presenter)",
                summary.events, summary.presenter_events
            );
            match summary.best_answer_rate {
                Some(rate) => println!(
                    "Replies: {} ({} best answers, {}%)",
                    summary.replies, summary.best_answers, rate
                ),
                None => println!("Replies: none"),
            }
            for (kind, count) in &summary.activity_types {
                println!("- {kind}: {count}");
            }

            let upcoming = stats::upcoming_events(&profile, Utc::now(), 5);
            if !upcoming.is_empty() {
                println!("Upcoming events:");
                for event in &upcoming {
                    println!("- {} {}", event.date.format("%Y-%m-%d"), event.title);
                }
            }
        }
        Commands::Report { out } => {
            let digest = report::build_report(&profile, &items, Utc::now());
            std::fs::write(&out, digest)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Digest written to {}.", out.display());
        }
        Commands::Export { out } => {
            let views = export::build_views(&items);
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    export::write_json(BufWriter::new(file), &views)?;
                    println!("Views written to {}.", path.display());
                }
                None => export::write_json(io::stdout().lock(), &views)?,
            }
        }
    }

    Ok(())
}
