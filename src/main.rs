// src/main.rs
//
// Command line entry point: refresh viewing contexts and query the store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use animegraph::application::commands::*;
use animegraph::application::AppState;
use animegraph::config::AppConfig;
use animegraph::db::get_database_stats;
use animegraph::integrations::ReqwestTransport;

/// Command-line arguments for animegraph
#[derive(Parser, Debug)]
#[command(name = "animegraph")]
#[command(about = "Anime catalog ingestion and genre co-occurrence graphs")]
#[command(version)]
struct Args {
    /// SQLite database file (defaults to the user data directory)
    #[arg(short, long, global = true, env = "ANIMEGRAPH_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh contexts ("global", "user:<name>") and rebuild their genre graphs
    Update {
        #[arg(default_value = "global")]
        contexts: Vec<String>,
    },
    /// Print the strongest genre connections of a context
    Graph {
        #[arg(default_value = "global")]
        context: String,
    },
    /// Fetch and store a single item
    Sync { id: i64 },
    /// Print the stored record of an item
    Anime { id: i64 },
    /// Catalog-wide statistics
    Stats {
        /// Number of studios to list
        #[arg(long)]
        studios: Option<usize>,
    },
    /// Studios linked by the items they share
    Studios {
        /// Most popular studio-credited items to scan
        #[arg(long)]
        items: Option<usize>,
    },
    /// Search the stored catalog
    Search {
        /// Substring of any title
        query: Option<String>,
        /// Genre name; repeat to match any of several
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long)]
        season: Option<String>,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long = "type")]
        media_type: Option<String>,
        #[arg(long)]
        min_score: Option<f64>,
        /// popularity, rank, score, title or aired
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the filter values present in the catalog
    Filters,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct StatsOutput {
    featured: Vec<animegraph::dto::AnimeSummaryDto>,
    score_distribution: Vec<animegraph::dto::ScoreBucketDto>,
    average_score_by_type: Vec<animegraph::dto::TypeScoreDto>,
    seasonal_trends: Vec<animegraph::dto::SeasonalTrendDto>,
    seasonal_trends_by_type: Vec<animegraph::dto::SeasonalTypeTrendDto>,
    top_studios: Vec<animegraph::dto::StudioDto>,
}

#[derive(Serialize)]
struct FiltersOutput {
    genres: Vec<animegraph::dto::GenreDto>,
    years: Vec<i64>,
}

async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Update { contexts } => {
            for context in contexts {
                let report = trigger_update(context.clone(), state)
                    .await
                    .map_err(|e| anyhow!(e))
                    .with_context(|| format!("Update of {} failed", context))?;
                print_json(&report)?;
            }

            let conn = state.pool.get()?;
            let stats = get_database_stats(&conn)?;
            log::info!(
                "Store: {} anime, {} genres, {} contexts, {} connections",
                stats.anime_count,
                stats.genre_count,
                stats.context_count,
                stats.connection_count
            );
        }
        Command::Graph { context } => {
            let links = get_connections(context.clone(), state)
                .await
                .map_err(|e| anyhow!(e))?;
            let summary = get_context_summary(context, state)
                .await
                .map_err(|e| anyhow!(e))?;
            match summary.last_updated {
                Some(at) => log::info!(
                    "{}: {} members, {} connections, last updated {}",
                    summary.context,
                    summary.member_count,
                    summary.connection_count,
                    at
                ),
                None => log::warn!("{} has never been updated", summary.context),
            }
            print_json(&links)?;
        }
        Command::Sync { id } => {
            let anime = sync_anime(id, state).await.map_err(|e| anyhow!(e))?;
            print_json(&anime)?;
        }
        Command::Anime { id } => {
            let anime = get_anime(id, state).await.map_err(|e| anyhow!(e))?;
            print_json(&anime)?;
        }
        Command::Stats { studios } => {
            let output = StatsOutput {
                featured: get_featured_anime(None, state).await.map_err(|e| anyhow!(e))?,
                score_distribution: get_score_distribution(state)
                    .await
                    .map_err(|e| anyhow!(e))?,
                average_score_by_type: get_average_score_by_type(state)
                    .await
                    .map_err(|e| anyhow!(e))?,
                seasonal_trends: get_seasonal_trends(state).await.map_err(|e| anyhow!(e))?,
                seasonal_trends_by_type: get_seasonal_trends_by_type(state)
                    .await
                    .map_err(|e| anyhow!(e))?,
                top_studios: get_top_studios(studios, state)
                    .await
                    .map_err(|e| anyhow!(e))?,
            };
            print_json(&output)?;
        }
        Command::Studios { items } => {
            let graph = get_studio_collaborations(items, state)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&graph)?;
        }
        Command::Search {
            query,
            genres,
            season,
            year,
            media_type,
            min_score,
            sort,
            order,
            page,
            limit,
        } => {
            let request = animegraph::dto::SearchRequestDto {
                query,
                genres,
                season,
                year,
                media_type,
                min_score,
                sort_by: sort,
                sort_order: order,
                page,
                limit,
            };
            let result = search_anime(request, state).await.map_err(|e| anyhow!(e))?;
            log::info!(
                "Page {} of {} ({} matches)",
                result.pagination.page,
                result.pagination.total_pages,
                result.pagination.total
            );
            print_json(&result)?;
        }
        Command::Filters => {
            let output = FiltersOutput {
                genres: get_available_genres(state).await.map_err(|e| anyhow!(e))?,
                years: get_available_years(state).await.map_err(|e| anyhow!(e))?,
            };
            print_json(&output)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    let transport = Arc::new(ReqwestTransport::new()?);
    let state = AppState::initialize(&config, transport).context("Failed to initialize")?;

    run(args.command, &state).await
}
