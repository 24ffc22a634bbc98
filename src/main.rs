use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reclaim::{
    analysis::{BudgetRange, UserPreferences},
    cache::{CacheLayer, LangCacheClient},
    config::Config,
    store::SqliteStore,
    tavily::TavilyClient,
    ReclaimAgent,
};

#[derive(Parser)]
#[command(name = "reclaim", version, about = "Mindful purchase analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a product listing URL
    Analyze {
        /// The listing URL to analyze
        url: String,
        /// User id for preference-aware scoring and history
        #[arg(long)]
        user: Option<String>,
    },
    /// Show a user's recent analyses
    History {
        user: String,
        /// Maximum number of analyses to return
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Read or update user preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Register a price alert for a product
    Alert {
        user: String,
        product_id: String,
        threshold: f64,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print stored preferences
    Get { user: String },
    /// Merge an update into stored preferences
    Set {
        user: String,
        #[arg(long)]
        budget_min: Option<f64>,
        #[arg(long)]
        budget_max: Option<f64>,
        /// Values the user cares about (repeatable)
        #[arg(long = "value")]
        values: Vec<String>,
        /// Product categories of interest (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let agent = match build_agent(&config).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Failed to initialize");
            return Err(e);
        }
    };

    match cli.command {
        Command::Analyze { url, user } => {
            let analysis = agent.analyze_product(&url, user.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::History { user, limit } => {
            let history = agent.get_browsing_history(&user, limit).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Command::Prefs { action } => match action {
            PrefsAction::Get { user } => {
                let prefs = agent.get_user_preferences(&user).await?;
                println!("{}", serde_json::to_string_pretty(&prefs)?);
            }
            PrefsAction::Set {
                user,
                budget_min,
                budget_max,
                values,
                categories,
            } => {
                let budget_range = budget_max.map(|max| BudgetRange {
                    min: budget_min.unwrap_or(0.0),
                    max,
                });
                let merged = agent
                    .set_user_preferences(
                        &user,
                        UserPreferences {
                            budget_range,
                            values,
                            categories,
                            alerts: Vec::new(),
                        },
                    )
                    .await?;
                println!("{}", serde_json::to_string_pretty(&merged)?);
            }
        },
        Command::Alert {
            user,
            product_id,
            threshold,
        } => {
            let alert = agent.create_price_alert(&user, &product_id, threshold).await?;
            println!("{}", serde_json::to_string_pretty(&alert)?);
        }
    }

    Ok(())
}

async fn build_agent(config: &Config) -> anyhow::Result<ReclaimAgent> {
    let tavily = config
        .tavily
        .as_ref()
        .map(|c| TavilyClient::new(c, config.request.clone()))
        .transpose()?;
    if tavily.is_none() {
        info!("No search credentials; running in detection-only mode");
    }

    let semantic = config
        .langcache
        .as_ref()
        .map(|c| LangCacheClient::new(c, &config.request))
        .transpose()?;
    let cache = Arc::new(CacheLayer::new(config.cache.clone(), semantic));

    let store = SqliteStore::new(&config.database).await?;
    info!(path = %config.database.path.display(), "Database initialized");

    let agent = ReclaimAgent::new(
        tavily,
        cache,
        Some(Arc::new(store)),
        config.request.clone(),
    )?;
    Ok(agent)
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        reclaim::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        reclaim::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
